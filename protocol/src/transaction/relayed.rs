//! Relayed transactions: fee-payer transactions submitted through a
//! subsidizing relay.
//!
//! The message (fee payer, recent blockhash, operations) is signed by the
//! fee payer into signature slot 0, and that signature is the transaction
//! identifier. The webhook service never adds a signature of its own to
//! this family.

use serde::{Deserialize, Serialize};

use super::types::{Operation, TransactionId};
use crate::config::SIGNATURE_LENGTH;
use crate::crypto::keys::{AccountId, ServiceKeypair};

/// Domain separator prepended to the message bytes.
const RELAYED_DOMAIN: &[u8] = b"paygate:relayed:v1";

/// A relayed-family transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayedTransaction {
    /// Signature slots. Slot 0 belongs to the fee payer; an all-zero slot
    /// has not been signed yet.
    pub signatures: Vec<Vec<u8>>,
    /// Account paying fees on behalf of the senders.
    pub fee_payer: AccountId,
    /// Recent blockhash binding the transaction to a validity window.
    pub recent_blockhash: [u8; 32],
    /// Operations in execution order.
    pub operations: Vec<Operation>,
}

impl RelayedTransaction {
    /// Creates an unsigned transaction with a single zeroed fee-payer slot.
    pub fn new(fee_payer: AccountId, recent_blockhash: [u8; 32], operations: Vec<Operation>) -> Self {
        Self {
            signatures: vec![vec![0u8; SIGNATURE_LENGTH]],
            fee_payer,
            recent_blockhash,
            operations,
        }
    }

    /// Canonical bytes the fee payer signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(96 + self.operations.len() * 96);
        buf.extend_from_slice(RELAYED_DOMAIN);
        buf.extend_from_slice(self.fee_payer.as_bytes());
        buf.extend_from_slice(&self.recent_blockhash);
        buf.extend_from_slice(&(self.operations.len() as u32).to_le_bytes());
        for op in &self.operations {
            op.write_canonical(&mut buf);
        }
        buf
    }

    /// The fee payer's signature, or `None` while slot 0 is missing or
    /// still zeroed.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signatures
            .first()
            .filter(|sig| sig.iter().any(|b| *b != 0))
            .map(Vec::as_slice)
    }

    /// The fee payer's signature as the transaction identifier.
    pub fn identifier(&self) -> Option<TransactionId> {
        self.signature().map(TransactionId::new)
    }

    /// Fills slot 0 with the fee payer's signature over the message.
    ///
    /// Used by relays and test fixtures; the signing gate never calls this.
    pub fn sign_as_fee_payer(&mut self, fee_payer: &ServiceKeypair) {
        let signature = fee_payer.sign(&self.message_bytes()).to_vec();
        match self.signatures.first_mut() {
            Some(slot) => *slot = signature,
            None => self.signatures.push(signature),
        }
    }

    /// Returns `true` if slot 0 holds a valid fee-payer signature.
    pub fn is_fee_payer_signed(&self) -> bool {
        self.signature()
            .map(|sig| self.fee_payer.verify(&self.message_bytes(), sig))
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned(fee_payer: AccountId) -> RelayedTransaction {
        RelayedTransaction::new(
            fee_payer,
            [9u8; 32],
            vec![Operation::transfer(
                AccountId::new([1u8; 32]),
                AccountId::new([2u8; 32]),
                42,
            )],
        )
    }

    #[test]
    fn unsigned_transaction_has_no_identifier() {
        let tx = unsigned(AccountId::new([3u8; 32]));
        assert!(tx.signature().is_none());
        assert!(tx.identifier().is_none());
    }

    #[test]
    fn fee_payer_signature_is_the_identifier() {
        let payer = ServiceKeypair::from_seed(&[4u8; 32]);
        let mut tx = unsigned(payer.account_id());
        tx.sign_as_fee_payer(&payer);

        let id = tx.identifier().expect("signed transaction has an id");
        assert_eq!(id.len(), SIGNATURE_LENGTH);
        assert_eq!(id.as_bytes(), tx.signatures[0].as_slice());
        assert!(tx.is_fee_payer_signed());
    }

    #[test]
    fn sign_as_fee_payer_fills_missing_slot() {
        let payer = ServiceKeypair::from_seed(&[4u8; 32]);
        let mut tx = unsigned(payer.account_id());
        tx.signatures.clear();
        tx.sign_as_fee_payer(&payer);
        assert_eq!(tx.signatures.len(), 1);
        assert!(tx.is_fee_payer_signed());
    }

    #[test]
    fn wrong_fee_payer_key_does_not_verify() {
        let payer = ServiceKeypair::from_seed(&[4u8; 32]);
        let impostor = ServiceKeypair::from_seed(&[5u8; 32]);
        let mut tx = unsigned(payer.account_id());
        tx.sign_as_fee_payer(&impostor);
        assert!(tx.identifier().is_some());
        assert!(!tx.is_fee_payer_signed());
    }
}
