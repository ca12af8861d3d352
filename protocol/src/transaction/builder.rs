//! Transaction construction via the builder pattern.
//!
//! The webhook never builds transactions itself; it only decodes them. The
//! builder exists for relays, fixtures and benchmarks that need realistic
//! input for either family without hand-assembling structs.

use super::envelope::EnvelopeTransaction;
use super::relayed::RelayedTransaction;
use super::types::{Memo, Operation, TransactionFamily};
use super::Transaction;
use crate::crypto::keys::{AccountId, ServiceKeypair};

/// Fluent builder for [`Transaction`] values of either family.
///
/// # Usage
///
/// ```
/// use paygate_protocol::crypto::{AccountId, ServiceKeypair};
/// use paygate_protocol::transaction::{TransactionBuilder, TransactionFamily};
///
/// let payer = ServiceKeypair::generate();
/// let tx = TransactionBuilder::new(TransactionFamily::Relayed)
///     .fee_payer(&payer)
///     .transfer(AccountId::new([1u8; 32]), AccountId::new([2u8; 32]), 1_000)
///     .build();
///
/// assert_eq!(tx.operations().len(), 1);
/// assert!(tx.identifier().is_some());
/// ```
///
/// For the relayed family, `source` is the fee payer. Without a
/// [`fee_payer`](Self::fee_payer) keypair the fee payer slot stays zeroed
/// and the built transaction has no identifier.
pub struct TransactionBuilder<'a> {
    family: TransactionFamily,
    source: AccountId,
    sequence: u64,
    recent_blockhash: [u8; 32],
    operations: Vec<Operation>,
    fee_payer: Option<&'a ServiceKeypair>,
}

impl<'a> TransactionBuilder<'a> {
    /// Creates a builder for `family` with an all-zero source and no
    /// operations.
    pub fn new(family: TransactionFamily) -> Self {
        Self {
            family,
            source: AccountId::new([0u8; 32]),
            sequence: 1,
            recent_blockhash: [0u8; 32],
            operations: Vec::new(),
            fee_payer: None,
        }
    }

    /// Envelope source account, or relayed fee payer account.
    pub fn source(mut self, source: AccountId) -> Self {
        self.source = source;
        self
    }

    /// Envelope sequence number. Ignored for relayed transactions.
    pub fn sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Relayed recent blockhash. Ignored for envelopes.
    pub fn recent_blockhash(mut self, blockhash: [u8; 32]) -> Self {
        self.recent_blockhash = blockhash;
        self
    }

    /// Sets the fee payer and signs slot 0 at build time. Implies
    /// `source(fee_payer.account_id())`.
    pub fn fee_payer(mut self, fee_payer: &'a ServiceKeypair) -> Self {
        self.source = fee_payer.account_id();
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Appends an arbitrary operation.
    pub fn operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Appends a transfer without a memo.
    pub fn transfer(self, from: AccountId, to: AccountId, amount: u64) -> Self {
        self.operation(Operation::transfer(from, to, amount))
    }

    /// Appends a transfer carrying `memo`.
    pub fn transfer_with_memo(
        self,
        from: AccountId,
        to: AccountId,
        amount: u64,
        memo: impl Into<Memo>,
    ) -> Self {
        self.operation(Operation::transfer(from, to, amount).with_memo(memo))
    }

    /// Consumes the builder and returns the transaction.
    pub fn build(self) -> Transaction {
        match self.family {
            TransactionFamily::Envelope => Transaction::Envelope(EnvelopeTransaction {
                source: self.source,
                sequence: self.sequence,
                operations: self.operations,
                signatures: Vec::new(),
            }),
            TransactionFamily::Relayed => {
                let mut tx =
                    RelayedTransaction::new(self.source, self.recent_blockhash, self.operations);
                if let Some(payer) = self.fee_payer {
                    tx.sign_as_fee_payer(payer);
                }
                Transaction::Relayed(tx)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
