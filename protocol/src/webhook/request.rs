//! The inbound side of a webhook call: the JSON body and the decoded,
//! read-only [`SignRequest`] handed to policy.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::WebhookError;
use crate::config::{INVOICE_LIST_FIELD, TRANSACTION_FIELD};
use crate::invoice::InvoiceList;
use crate::payment::{payments_from_transaction, ReadOnlyPayment};
use crate::transaction::{decoder_for, Transaction, TransactionFamily, TransactionId};

/// JSON body of `POST /sign_transaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionBody {
    /// Wire family of `transaction`. Defaults to relayed.
    #[serde(default)]
    pub family: TransactionFamily,
    /// Base64 transaction blob. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    /// Base64 invoice-list blob. Optional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_list: Option<String>,
}

impl SignTransactionBody {
    /// Builds a body from raw blobs. Relays and tests use this.
    pub fn new(family: TransactionFamily, transaction: &[u8], invoice_list: Option<&[u8]>) -> Self {
        Self {
            family,
            transaction: Some(STANDARD.encode(transaction)),
            invoice_list: invoice_list.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

/// A decoded sign-transaction request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    transaction: Transaction,
    payments: Vec<ReadOnlyPayment>,
}

impl SignRequest {
    /// Decodes a JSON body.
    ///
    /// The transaction field is checked for presence first, so a missing
    /// transaction is always [`WebhookError::MissingField`], whatever else
    /// is wrong with the body. An empty `invoice_list` is treated as absent.
    pub fn from_body(body: &SignTransactionBody) -> Result<Self, WebhookError> {
        let tx_b64 = match body.transaction.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Err(WebhookError::MissingField {
                    field: TRANSACTION_FIELD,
                })
            }
        };

        let invoice_bytes = match body.invoice_list.as_deref() {
            Some(s) if !s.is_empty() => Some(decode_base64(INVOICE_LIST_FIELD, s)?),
            _ => None,
        };
        let tx_bytes = decode_base64(TRANSACTION_FIELD, tx_b64)?;

        Self::decode(body.family, &tx_bytes, invoice_bytes.as_deref())
    }

    /// Decodes raw blobs: invoice list first, then the transaction, then
    /// payment extraction.
    pub fn decode(
        family: TransactionFamily,
        transaction: &[u8],
        invoice_list: Option<&[u8]>,
    ) -> Result<Self, WebhookError> {
        if transaction.is_empty() {
            return Err(WebhookError::MissingField {
                field: TRANSACTION_FIELD,
            });
        }

        let invoices = invoice_list
            .map(InvoiceList::decode)
            .transpose()
            .map_err(|e| WebhookError::Decode {
                target: INVOICE_LIST_FIELD,
                reason: e.to_string(),
            })?;

        let transaction =
            decoder_for(family)
                .decode(transaction)
                .map_err(|e| WebhookError::Decode {
                    target: TRANSACTION_FIELD,
                    reason: e.to_string(),
                })?;

        let payments = payments_from_transaction(&transaction, invoices.as_ref())?;

        Ok(Self {
            transaction,
            payments,
        })
    }

    /// Payments in transaction order.
    pub fn payments(&self) -> &[ReadOnlyPayment] {
        &self.payments
    }

    /// The decoded transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn family(&self) -> TransactionFamily {
        self.transaction.family()
    }

    /// The transaction ID, if available: 32 bytes for envelopes, 64 bytes
    /// for relayed transactions whose fee payer has signed.
    pub fn tx_id(&self) -> Option<TransactionId> {
        self.transaction.identifier()
    }
}

fn decode_base64(field: &'static str, value: &str) -> Result<Vec<u8>, WebhookError> {
    STANDARD.decode(value).map_err(|e| WebhookError::Decode {
        target: field,
        reason: format!("invalid base64: {}", e),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
