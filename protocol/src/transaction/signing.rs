//! The signing gate: adds the service co-signature where the family needs
//! one.
//!
//! Envelope transactions get an Ed25519 signature over their hash, tagged
//! with the service key's hint. Relayed transactions are submitted by a
//! fee-paying relay and are left untouched.

use thiserror::Error;

use super::Transaction;
use crate::crypto::keys::{AccountId, ServiceKeypair};

/// What the gate did to the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutcome {
    /// A service signature was appended.
    Signed,
    /// The family does not take a service signature; nothing changed.
    Skipped,
}

/// Errors from the signing gate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The transaction already carries a valid signature from this key.
    /// Signing twice would produce a duplicate slot.
    #[error("transaction is already signed by {signer}")]
    AlreadySigned { signer: AccountId },
}

/// Applies the service signature to `tx` if its family requires one.
///
/// # Example
///
/// ```
/// use paygate_protocol::crypto::{AccountId, ServiceKeypair};
/// use paygate_protocol::transaction::{sign_transaction, SignOutcome, TransactionBuilder, TransactionFamily};
///
/// let service = ServiceKeypair::generate();
/// let mut tx = TransactionBuilder::new(TransactionFamily::Envelope)
///     .source(AccountId::new([1u8; 32]))
///     .transfer(AccountId::new([1u8; 32]), AccountId::new([2u8; 32]), 500)
///     .build();
///
/// assert_eq!(sign_transaction(&mut tx, &service).unwrap(), SignOutcome::Signed);
/// ```
pub fn sign_transaction(
    tx: &mut Transaction,
    keypair: &ServiceKeypair,
) -> Result<SignOutcome, SigningError> {
    match tx {
        Transaction::Envelope(envelope) => {
            let signer = keypair.account_id();
            if envelope.is_signed_by(&signer) {
                return Err(SigningError::AlreadySigned { signer });
            }
            envelope.append_signature(keypair);
            tracing::debug!(signer = %signer, "envelope co-signed");
            Ok(SignOutcome::Signed)
        }
        // TODO: co-sign relayed transactions once the relay accepts a
        // service signature slot for subsidized submissions.
        Transaction::Relayed(_) => Ok(SignOutcome::Skipped),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
