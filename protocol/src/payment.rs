//! # Payment Extraction
//!
//! Turns a decoded transaction (and, when supplied, its invoice list) into
//! the ordered [`ReadOnlyPayment`]s that business policy inspects.
//!
//! Only transfer operations become payments. When an invoice list is
//! present it must hold exactly one invoice per transfer, matched by
//! position among the transfers. Every payment remembers the index of its
//! operation in the *unfiltered* operation list, because that is the index
//! a rejection refers back to.

use serde::{Deserialize, Serialize};

use crate::crypto::keys::AccountId;
use crate::invoice::{Invoice, InvoiceList};
use crate::transaction::{Memo, Transaction};
use crate::webhook::WebhookError;

/// What a payment points at for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentReference {
    /// Transfer without memo and no invoice list.
    Unreferenced,
    /// The operation's own memo.
    Memo(Memo),
    /// The invoice matched to this transfer.
    Invoice(Invoice),
}

impl PaymentReference {
    pub fn invoice(&self) -> Option<&Invoice> {
        match self {
            Self::Invoice(invoice) => Some(invoice),
            _ => None,
        }
    }

    pub fn memo(&self) -> Option<&Memo> {
        match self {
            Self::Memo(memo) => Some(memo),
            _ => None,
        }
    }
}

/// One payment intent extracted from a transaction. Never mutated after
/// extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOnlyPayment {
    pub sender: AccountId,
    pub destination: AccountId,
    pub amount: u64,
    pub reference: PaymentReference,
    /// Position of the source operation in `Transaction::operations()`.
    pub op_index: usize,
}

/// Extracts payments from `tx` in transaction order.
///
/// Fails with [`WebhookError::InvoiceMismatch`] before producing anything
/// if `invoices` is supplied and its length differs from the number of
/// transfer operations. A transaction with no transfers yields an empty
/// vector.
pub fn payments_from_transaction(
    tx: &Transaction,
    invoices: Option<&InvoiceList>,
) -> Result<Vec<ReadOnlyPayment>, WebhookError> {
    let transfers: Vec<_> = tx
        .operations()
        .iter()
        .enumerate()
        .filter(|(_, op)| op.kind.is_transfer())
        .collect();

    if let Some(list) = invoices {
        if list.len() != transfers.len() {
            return Err(WebhookError::InvoiceMismatch {
                invoices: list.len(),
                transfers: transfers.len(),
            });
        }
    }

    let payments = transfers
        .into_iter()
        .enumerate()
        .map(|(cursor, (op_index, op))| {
            let reference = match (invoices.and_then(|list| list.get(cursor)), &op.memo) {
                (Some(invoice), _) => PaymentReference::Invoice(invoice.clone()),
                (None, Some(memo)) => PaymentReference::Memo(memo.clone()),
                (None, None) => PaymentReference::Unreferenced,
            };
            ReadOnlyPayment {
                sender: op.source,
                destination: op.destination,
                amount: op.amount,
                reference,
                op_index,
            }
        })
        .collect();

    Ok(payments)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::LineItem;
    use crate::transaction::{Operation, TransactionBuilder, TransactionFamily};

    fn a(b: u8) -> AccountId {
        AccountId::new([b; 32])
    }

    fn invoice(title: &str) -> Invoice {
        Invoice::new(vec![LineItem::new(title, 100)])
    }

    /// fee, transfer, create-account, transfer, transfer
    fn mixed(family: TransactionFamily) -> Transaction {
        TransactionBuilder::new(family)
            .source(a(1))
            .operation(Operation::fee(a(1), 5))
            .transfer(a(1), a(2), 10)
            .operation(Operation::create_account(a(1), a(9), 1))
            .transfer_with_memo(a(1), a(3), 20, "memo-b")
            .transfer(a(4), a(5), 30)
            .build()
    }

    #[test]
    fn transfers_only_with_original_indexes() {
        let payments = payments_from_transaction(&mixed(TransactionFamily::Envelope), None).unwrap();

        assert_eq!(payments.len(), 3);
        let indexes: Vec<_> = payments.iter().map(|p| p.op_index).collect();
        assert_eq!(indexes, vec![1, 3, 4]);
        assert_eq!(payments[0].destination, a(2));
        assert_eq!(payments[2].sender, a(4));
        assert_eq!(payments[2].amount, 30);
    }

    #[test]
    fn memo_is_the_reference_without_invoices() {
        let payments = payments_from_transaction(&mixed(TransactionFamily::Relayed), None).unwrap();
        assert_eq!(payments[0].reference, PaymentReference::Unreferenced);
        assert_eq!(payments[1].reference.memo().unwrap().as_text(), "memo-b");
    }

    #[test]
    fn invoices_match_by_transfer_position() {
        let list = InvoiceList::new(vec![invoice("first"), invoice("second"), invoice("third")]);
        let payments =
            payments_from_transaction(&mixed(TransactionFamily::Envelope), Some(&list)).unwrap();

        for (payment, expected) in payments.iter().zip(&list.invoices) {
            assert_eq!(payment.reference.invoice(), Some(expected));
        }
        // The memo on op 3 is superseded by the invoice.
        assert!(payments[1].reference.memo().is_none());
    }

    #[test]
    fn too_few_invoices_is_a_mismatch() {
        let list = InvoiceList::new(vec![invoice("only")]);
        let err = payments_from_transaction(&mixed(TransactionFamily::Envelope), Some(&list))
            .unwrap_err();
        assert!(matches!(
            err,
            WebhookError::InvoiceMismatch {
                invoices: 1,
                transfers: 3
            }
        ));
    }

    #[test]
    fn too_many_invoices_is_a_mismatch() {
        let list = InvoiceList::new(vec![invoice("x"); 4]);
        let err = payments_from_transaction(&mixed(TransactionFamily::Relayed), Some(&list))
            .unwrap_err();
        assert!(matches!(
            err,
            WebhookError::InvoiceMismatch {
                invoices: 4,
                transfers: 3
            }
        ));
    }

    #[test]
    fn no_transfers_is_empty_not_an_error() {
        let tx = TransactionBuilder::new(TransactionFamily::Envelope)
            .operation(Operation::fee(a(1), 5))
            .build();
        assert!(payments_from_transaction(&tx, None).unwrap().is_empty());

        let empty = TransactionBuilder::new(TransactionFamily::Relayed).build();
        assert!(payments_from_transaction(&empty, None).unwrap().is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let tx = mixed(TransactionFamily::Envelope);
        let bytes = tx.to_bytes().unwrap();
        let decoder = crate::transaction::decoder_for(TransactionFamily::Envelope);

        let first = payments_from_transaction(&decoder.decode(&bytes).unwrap(), None).unwrap();
        let second = payments_from_transaction(&decoder.decode(&bytes).unwrap(), None).unwrap();
        assert_eq!(first, second);
    }
}
