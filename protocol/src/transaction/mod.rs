//! # Transaction Module
//!
//! The typed view of a transaction the webhook was asked to approve.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    Shared vocabulary (Operation, Memo, TransactionFamily, TransactionId)
//! envelope.rs Envelope family: hash-identified, co-signed by this service
//! relayed.rs  Relayed family: fee-payer signed, identified by that signature
//! codec.rs    TransactionDecoder trait and the bincode wire format
//! builder.rs  Fluent TransactionBuilder for fixtures and tools
//! signing.rs  The signing gate
//! ```
//!
//! ## Design Decisions
//!
//! - [`Transaction`] is a closed enum over the two families. Callers only see
//!   `operations()` and `identifier()`; the family-specific parts stay in
//!   their own modules.
//! - Identifiers never depend on signatures the service adds, so a
//!   transaction keeps its ID across the signing gate.
//! - All amounts are `u64` in the smallest unit.

pub mod builder;
pub mod codec;
pub mod envelope;
pub mod relayed;
pub mod signing;
pub mod types;

pub use builder::TransactionBuilder;
pub use codec::{decoder_for, CodecError, EnvelopeDecoder, RelayedDecoder, TransactionDecoder};
pub use envelope::{DecoratedSignature, EnvelopeTransaction};
pub use relayed::RelayedTransaction;
pub use signing::{sign_transaction, SignOutcome, SigningError};
pub use types::{Memo, Operation, OperationKind, TransactionFamily, TransactionId};

use crate::crypto::keys::AccountId;

/// A decoded transaction of either family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Envelope(EnvelopeTransaction),
    Relayed(RelayedTransaction),
}

impl Transaction {
    /// Which wire family this transaction came from.
    pub fn family(&self) -> TransactionFamily {
        match self {
            Self::Envelope(_) => TransactionFamily::Envelope,
            Self::Relayed(_) => TransactionFamily::Relayed,
        }
    }

    /// Operations in transaction order. Indexes into this slice are the
    /// indexes policy uses to reject individual payments.
    pub fn operations(&self) -> &[Operation] {
        match self {
            Self::Envelope(tx) => &tx.operations,
            Self::Relayed(tx) => &tx.operations,
        }
    }

    /// The deterministic identifier: 32 bytes for envelopes, 64 bytes for
    /// relayed transactions once the fee payer has signed.
    pub fn identifier(&self) -> Option<TransactionId> {
        match self {
            Self::Envelope(tx) => Some(tx.identifier()),
            Self::Relayed(tx) => tx.identifier(),
        }
    }

    /// Whether `account` has already signed. Relayed transactions only
    /// carry the fee payer's signature, so this is always false for them.
    pub fn is_signed_by(&self, account: &AccountId) -> bool {
        match self {
            Self::Envelope(tx) => tx.is_signed_by(account),
            Self::Relayed(_) => false,
        }
    }

    /// Encodes the transaction in its family's wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(self)
    }
}

impl From<EnvelopeTransaction> for Transaction {
    fn from(tx: EnvelopeTransaction) -> Self {
        Self::Envelope(tx)
    }
}

impl From<RelayedTransaction> for Transaction {
    fn from(tx: RelayedTransaction) -> Self {
        Self::Relayed(tx)
    }
}
