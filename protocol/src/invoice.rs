//! # Invoices
//!
//! Billing metadata a merchant attaches to payments. The webhook receives
//! an [`InvoiceList`] blob next to the transaction; invoice `i` belongs to
//! the `i`-th transfer operation.
//!
//! The blob is bincode-encoded and validated on decode: at least one and at
//! most [`MAX_INVOICES`] invoices, each with between one and
//! [`MAX_LINE_ITEMS`] line items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{MAX_INVOICES, MAX_INVOICE_LIST_SIZE_BYTES, MAX_LINE_ITEMS};

/// Errors raised while decoding or encoding an invoice list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceDecodeError {
    #[error("invoice list is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("malformed invoice list: {0}")]
    Malformed(String),

    #[error("invoice list must contain between 1 and {max} invoices, got {count}")]
    InvoiceCount { count: usize, max: usize },

    #[error("invoice {index} must contain between 1 and {max} line items, got {count}")]
    LineItemCount {
        index: usize,
        count: usize,
        max: usize,
    },

    #[error("failed to encode invoice list: {0}")]
    Encode(String),
}

/// One billed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    pub description: String,
    /// Amount in the smallest unit of the transfer asset.
    pub amount: u64,
    /// Merchant-defined SKU reference, opaque to the webhook.
    pub sku: Option<Vec<u8>>,
}

impl LineItem {
    pub fn new(title: impl Into<String>, amount: u64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            amount,
            sku: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sku(mut self, sku: impl Into<Vec<u8>>) -> Self {
        self.sku = Some(sku.into());
        self
    }
}

/// The invoice attached to a single payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub items: Vec<LineItem>,
}

impl Invoice {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Sum of line item amounts, or `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |acc, item| acc.checked_add(item.amount))
    }
}

/// Invoices in transfer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceList {
    pub invoices: Vec<Invoice>,
}

impl InvoiceList {
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self { invoices }
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Invoice> {
        self.invoices.get(index)
    }

    /// Decode and validate an invoice-list blob.
    pub fn decode(bytes: &[u8]) -> Result<Self, InvoiceDecodeError> {
        if bytes.len() > MAX_INVOICE_LIST_SIZE_BYTES {
            return Err(InvoiceDecodeError::TooLarge {
                size: bytes.len(),
                max: MAX_INVOICE_LIST_SIZE_BYTES,
            });
        }
        let list: InvoiceList = bincode::deserialize(bytes)
            .map_err(|e| InvoiceDecodeError::Malformed(e.to_string()))?;
        list.validate()?;
        Ok(list)
    }

    /// Encode in the wire format [`decode`](Self::decode) accepts.
    pub fn encode(&self) -> Result<Vec<u8>, InvoiceDecodeError> {
        bincode::serialize(self).map_err(|e| InvoiceDecodeError::Encode(e.to_string()))
    }

    fn validate(&self) -> Result<(), InvoiceDecodeError> {
        if self.invoices.is_empty() || self.invoices.len() > MAX_INVOICES {
            return Err(InvoiceDecodeError::InvoiceCount {
                count: self.invoices.len(),
                max: MAX_INVOICES,
            });
        }
        for (index, invoice) in self.invoices.iter().enumerate() {
            let count = invoice.items.len();
            if count == 0 || count > MAX_LINE_ITEMS {
                return Err(InvoiceDecodeError::LineItemCount {
                    index,
                    count,
                    max: MAX_LINE_ITEMS,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
