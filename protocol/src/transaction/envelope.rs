//! Envelope transactions: the family this service co-signs.
//!
//! An envelope carries a source account, a sequence number, its operations
//! and a list of decorated signatures. The transaction hash (SHA-256 of the
//! signable payload) is both the identifier and the message every signer
//! signs, so adding a signature never changes the ID.

use serde::{Deserialize, Serialize};

use super::types::{Operation, TransactionId};
use crate::config::SIGNATURE_HINT_LENGTH;
use crate::crypto::hash::sha256_array;
use crate::crypto::keys::{AccountId, ServiceKeypair};

/// Domain separator prepended to the signable payload.
const ENVELOPE_DOMAIN: &[u8] = b"paygate:envelope:v1";

/// A signature tagged with the last bytes of its signer's public key, so
/// verifiers can find the right key without trying every candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    pub hint: [u8; SIGNATURE_HINT_LENGTH],
    pub signature: Vec<u8>,
}

/// An envelope-family transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeTransaction {
    /// Account paying the fee and consuming the sequence number.
    pub source: AccountId,
    /// Per-source sequence number.
    pub sequence: u64,
    /// Operations in execution order.
    pub operations: Vec<Operation>,
    /// Signatures over [`EnvelopeTransaction::hash`].
    pub signatures: Vec<DecoratedSignature>,
}

impl EnvelopeTransaction {
    /// Canonical bytes covered by the hash. Signatures are excluded.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.operations.len() * 96);
        buf.extend_from_slice(ENVELOPE_DOMAIN);
        buf.extend_from_slice(self.source.as_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&(self.operations.len() as u32).to_le_bytes());
        for op in &self.operations {
            op.write_canonical(&mut buf);
        }
        buf
    }

    /// SHA-256 of the signable bytes.
    pub fn hash(&self) -> [u8; 32] {
        sha256_array(&self.signable_bytes())
    }

    /// Envelope transactions always have an identifier.
    pub fn identifier(&self) -> TransactionId {
        TransactionId::new(self.hash().to_vec())
    }

    /// Returns `true` if `account` already holds a valid signature slot on
    /// this envelope.
    pub fn is_signed_by(&self, account: &AccountId) -> bool {
        let hint = account.signature_hint();
        let hash = self.hash();
        self.signatures
            .iter()
            .any(|s| s.hint == hint && account.verify(&hash, &s.signature))
    }

    /// Signs the hash and appends the decorated signature.
    ///
    /// Does not check for an existing signature from the same key; the
    /// signing gate does that before calling in.
    pub(crate) fn append_signature(&mut self, keypair: &ServiceKeypair) {
        let signature = keypair.sign(&self.hash());
        self.signatures.push(DecoratedSignature {
            hint: keypair.account_id().signature_hint(),
            signature: signature.to_vec(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnvelopeTransaction {
        EnvelopeTransaction {
            source: AccountId::new([1u8; 32]),
            sequence: 7,
            operations: vec![Operation::transfer(
                AccountId::new([1u8; 32]),
                AccountId::new([2u8; 32]),
                500,
            )],
            signatures: vec![],
        }
    }

    #[test]
    fn identifier_is_32_bytes() {
        assert_eq!(sample().identifier().len(), 32);
    }

    #[test]
    fn signing_does_not_change_identifier() {
        let kp = ServiceKeypair::from_seed(&[5u8; 32]);
        let mut tx = sample();
        let before = tx.identifier();
        tx.append_signature(&kp);
        assert_eq!(tx.identifier(), before);
    }

    #[test]
    fn is_signed_by_requires_valid_signature() {
        let kp = ServiceKeypair::from_seed(&[5u8; 32]);
        let mut tx = sample();
        assert!(!tx.is_signed_by(&kp.account_id()));

        tx.append_signature(&kp);
        assert!(tx.is_signed_by(&kp.account_id()));

        // A matching hint with garbage bytes is not a signature.
        let mut forged = sample();
        forged.signatures.push(DecoratedSignature {
            hint: kp.account_id().signature_hint(),
            signature: vec![0u8; 64],
        });
        assert!(!forged.is_signed_by(&kp.account_id()));
    }

    #[test]
    fn hash_covers_sequence() {
        let a = sample();
        let mut b = sample();
        b.sequence += 1;
        assert_ne!(a.hash(), b.hash());
    }
}
