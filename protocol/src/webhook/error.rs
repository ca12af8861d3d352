//! Error types for the sign-transaction webhook.
//!
//! Every failure is local to one call. Client-side problems (missing
//! field, undecodable blob, invoice count mismatch) are reported once and
//! never retried here; the caller decides whether to resend.

use thiserror::Error;

use crate::transaction::{CodecError, SigningError};

/// Errors that can occur while handling a sign-transaction call.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A required field was absent or empty.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Name of the JSON field.
        field: &'static str,
    },

    /// A blob could not be decoded. `reason` is the decoder's own message.
    #[error("failed to decode `{target}`: {reason}")]
    Decode {
        /// Which field failed to decode.
        target: &'static str,
        /// The underlying decoder diagnostic.
        reason: String,
    },

    /// Both blobs decoded but the invoice list does not line up with the
    /// transfer operations.
    #[error("invoice count {invoices} does not match transfer operation count {transfers}")]
    InvoiceMismatch {
        /// Number of invoices supplied.
        invoices: usize,
        /// Number of transfer operations in the transaction.
        transfers: usize,
    },

    /// Policy tried to sign a response it had already rejected.
    #[error("cannot sign a rejected response")]
    SignRejected,

    /// The signing gate refused.
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    /// Re-encoding the co-signed transaction failed.
    #[error("encoding failed: {0}")]
    Encode(#[from] CodecError),
}

impl WebhookError {
    /// `true` when the caller sent a bad request, `false` when the failure
    /// is on this side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::Decode { .. } | Self::InvoiceMismatch { .. }
        )
    }
}
