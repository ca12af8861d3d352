//! The outbound side of a webhook call.
//!
//! A [`SignResponse`] starts `Pending` and is moved by policy to `Approved`
//! or `Rejected`. Rejected is absorbing. [`SignResponse::into_reply`]
//! renders the final [`SignReply`] JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{SignRequest, WebhookError};
use crate::crypto::keys::ServiceKeypair;
use crate::transaction::{sign_transaction, SignOutcome, Transaction};

/// Why a single payment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceErrorReason {
    Unknown,
    AlreadyPaid,
    WrongDestination,
    SkuNotFound,
}

impl InvoiceErrorReason {
    /// The wire tag, e.g. `WRONG_DESTINATION`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::WrongDestination => "WRONG_DESTINATION",
            Self::SkuNotFound => "SKU_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for InvoiceErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejection tied to one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceError {
    /// Index into the transaction's full operation list.
    pub op_index: usize,
    pub reason: InvoiceErrorReason,
}

/// Where a response stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Decision {
    #[default]
    Pending,
    Approved,
    Rejected { invoice_errors: Vec<InvoiceError> },
}

impl Decision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// The mutable decision policy builds for one request.
#[derive(Debug, Clone, Default)]
pub struct SignResponse {
    decision: Decision,
    signed: Option<CoSigned>,
}

#[derive(Debug, Clone)]
struct CoSigned {
    transaction: Transaction,
    encoded: String,
}

impl SignResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn is_rejected(&self) -> bool {
        self.decision.is_rejected()
    }

    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }

    /// Errors recorded so far. Empty unless rejected.
    pub fn invoice_errors(&self) -> &[InvoiceError] {
        match &self.decision {
            Decision::Rejected { invoice_errors } => invoice_errors,
            _ => &[],
        }
    }

    /// Rejects the whole transaction without naming an operation.
    pub fn reject(&mut self) {
        if !self.decision.is_rejected() {
            self.decision = Decision::Rejected {
                invoice_errors: Vec::new(),
            };
        }
    }

    /// Rejects the transaction and records why `op_index` was refused.
    /// `op_index` is not checked against the request.
    pub fn mark_invoice_error(&mut self, op_index: usize, reason: InvoiceErrorReason) {
        let error = InvoiceError { op_index, reason };
        match &mut self.decision {
            Decision::Rejected { invoice_errors } => invoice_errors.push(error),
            _ => {
                self.decision = Decision::Rejected {
                    invoice_errors: vec![error],
                }
            }
        }
    }

    /// Approves a pending response. Returns `false` if already rejected.
    pub fn approve(&mut self) -> bool {
        match self.decision {
            Decision::Rejected { .. } => false,
            _ => {
                self.decision = Decision::Approved;
                true
            }
        }
    }

    /// Resolves `Pending` to `Approved`.
    pub fn finalize(&mut self) {
        if self.decision == Decision::Pending {
            self.decision = Decision::Approved;
        }
    }

    /// Runs the signing gate over a copy of the request's transaction and
    /// approves the response.
    ///
    /// A second call signs the already co-signed copy, so the gate refuses
    /// it with [`SigningError::AlreadySigned`](crate::transaction::SigningError).
    pub fn sign(
        &mut self,
        request: &SignRequest,
        keypair: &ServiceKeypair,
    ) -> Result<SignOutcome, WebhookError> {
        if self.decision.is_rejected() {
            return Err(WebhookError::SignRejected);
        }

        let mut tx = match &self.signed {
            Some(signed) => signed.transaction.clone(),
            None => request.transaction().clone(),
        };
        let outcome = sign_transaction(&mut tx, keypair)?;
        if outcome == SignOutcome::Signed {
            let encoded = STANDARD.encode(tx.to_bytes()?);
            self.signed = Some(CoSigned {
                transaction: tx,
                encoded,
            });
        }

        self.decision = Decision::Approved;
        Ok(outcome)
    }

    /// The co-signed transaction, if the gate produced one.
    pub fn signed_transaction(&self) -> Option<&Transaction> {
        self.signed.as_ref().map(|s| &s.transaction)
    }

    /// Finalizes and renders the reply.
    pub fn into_reply(mut self) -> SignReply {
        self.finalize();
        match self.decision {
            Decision::Rejected { invoice_errors } => SignReply {
                rejected: true,
                invoice_errors: (!invoice_errors.is_empty()).then_some(invoice_errors),
                envelope: None,
            },
            _ => SignReply {
                rejected: false,
                invoice_errors: None,
                envelope: self.signed.map(|s| s.encoded),
            },
        }
    }
}

/// JSON reply body of the webhook.
///
/// `rejected` is not part of the body; the transport turns it into a
/// status code. A bare reject and a plain approval both render as `{}`, so
/// the body alone cannot be read back into a reply and this type is
/// serialize-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignReply {
    #[serde(skip)]
    pub rejected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_errors: Option<Vec<InvoiceError>>,
    /// Base64 of the co-signed envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
