//! Wire codecs for both transaction families.
//!
//! Each family has its own [`TransactionDecoder`]. Both use bincode as the
//! byte format and then run the same structural checks (size, operation
//! count, memo length, signature widths) so that a `Transaction` handed to
//! the rest of the crate is always well-formed.

use thiserror::Error;

use super::envelope::EnvelopeTransaction;
use super::relayed::RelayedTransaction;
use super::types::{Operation, TransactionFamily};
use super::Transaction;
use crate::config::{MAX_MEMO_LENGTH, MAX_TX_OPERATIONS, MAX_TX_SIZE_BYTES, SIGNATURE_LENGTH};

/// Errors raised while decoding or encoding a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The blob exceeds [`MAX_TX_SIZE_BYTES`].
    #[error("transaction is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    /// bincode could not parse the blob.
    #[error("malformed {family} transaction: {reason}")]
    Malformed {
        family: TransactionFamily,
        reason: String,
    },

    /// The blob parsed but violates a structural rule.
    #[error("invalid {family} transaction: {reason}")]
    Invalid {
        family: TransactionFamily,
        reason: String,
    },

    /// Serialization failed.
    #[error("failed to encode transaction: {0}")]
    Encode(String),
}

/// Turns raw bytes into a typed [`Transaction`].
///
/// Implementations are stateless; the webhook picks one per request based
/// on the declared family.
pub trait TransactionDecoder: Send + Sync {
    /// The family this decoder understands.
    fn family(&self) -> TransactionFamily;

    /// Decode and validate.
    fn decode(&self, bytes: &[u8]) -> Result<Transaction, CodecError>;
}

/// Decoder for [`TransactionFamily::Envelope`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDecoder;

/// Decoder for [`TransactionFamily::Relayed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayedDecoder;

impl TransactionDecoder for EnvelopeDecoder {
    fn family(&self) -> TransactionFamily {
        TransactionFamily::Envelope
    }

    fn decode(&self, bytes: &[u8]) -> Result<Transaction, CodecError> {
        let family = self.family();
        check_size(bytes)?;
        let tx: EnvelopeTransaction =
            bincode::deserialize(bytes).map_err(|e| CodecError::Malformed {
                family,
                reason: e.to_string(),
            })?;

        check_operations(family, &tx.operations)?;
        for (i, sig) in tx.signatures.iter().enumerate() {
            if sig.signature.len() != SIGNATURE_LENGTH {
                return Err(CodecError::Invalid {
                    family,
                    reason: format!(
                        "signature {} is {} bytes, expected {}",
                        i,
                        sig.signature.len(),
                        SIGNATURE_LENGTH
                    ),
                });
            }
        }

        Ok(Transaction::Envelope(tx))
    }
}

impl TransactionDecoder for RelayedDecoder {
    fn family(&self) -> TransactionFamily {
        TransactionFamily::Relayed
    }

    fn decode(&self, bytes: &[u8]) -> Result<Transaction, CodecError> {
        let family = self.family();
        check_size(bytes)?;
        let tx: RelayedTransaction =
            bincode::deserialize(bytes).map_err(|e| CodecError::Malformed {
                family,
                reason: e.to_string(),
            })?;

        if tx.signatures.is_empty() {
            return Err(CodecError::Invalid {
                family,
                reason: "missing fee payer signature slot".into(),
            });
        }
        if let Some(i) = tx
            .signatures
            .iter()
            .position(|sig| sig.len() != SIGNATURE_LENGTH)
        {
            return Err(CodecError::Invalid {
                family,
                reason: format!("signature slot {} is not {} bytes", i, SIGNATURE_LENGTH),
            });
        }
        check_operations(family, &tx.operations)?;

        Ok(Transaction::Relayed(tx))
    }
}

/// Returns the decoder for `family`.
pub fn decoder_for(family: TransactionFamily) -> &'static dyn TransactionDecoder {
    match family {
        TransactionFamily::Envelope => &EnvelopeDecoder,
        TransactionFamily::Relayed => &RelayedDecoder,
    }
}

/// Encodes a transaction in its family's wire format.
pub fn encode(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let bytes = match tx {
        Transaction::Envelope(inner) => bincode::serialize(inner),
        Transaction::Relayed(inner) => bincode::serialize(inner),
    };
    bytes.map_err(|e| CodecError::Encode(e.to_string()))
}

fn check_size(bytes: &[u8]) -> Result<(), CodecError> {
    if bytes.len() > MAX_TX_SIZE_BYTES {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            max: MAX_TX_SIZE_BYTES,
        });
    }
    Ok(())
}

fn check_operations(family: TransactionFamily, operations: &[Operation]) -> Result<(), CodecError> {
    if operations.len() > MAX_TX_OPERATIONS {
        return Err(CodecError::Invalid {
            family,
            reason: format!(
                "{} operations exceeds the limit of {}",
                operations.len(),
                MAX_TX_OPERATIONS
            ),
        });
    }
    for (i, op) in operations.iter().enumerate() {
        if let Some(memo) = &op.memo {
            if memo.len() > MAX_MEMO_LENGTH {
                return Err(CodecError::Invalid {
                    family,
                    reason: format!(
                        "operation {} memo is {} bytes, limit is {}",
                        i,
                        memo.len(),
                        MAX_MEMO_LENGTH
                    ),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
