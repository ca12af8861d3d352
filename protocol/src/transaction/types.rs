//! Core type definitions shared by both transaction families.
//!
//! Decoders for each family produce these same types, so everything above
//! the codec (payment extraction, policy, the webhook reply) sees one
//! vocabulary regardless of where the bytes came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::keys::AccountId;

// ---------------------------------------------------------------------------
// TransactionFamily
// ---------------------------------------------------------------------------

/// The two wire formats the webhook accepts.
///
/// The family decides how a transaction is decoded, how its identifier is
/// derived, and whether the service co-signs it. Nothing downstream of the
/// signing gate needs to know which family it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionFamily {
    /// Transactions that require a direct co-signature from this service.
    /// Identified by the SHA-256 of the signable payload.
    Envelope,
    /// Fee-payer transactions submitted through a subsidizing relay.
    /// Identified by the fee payer's signature; the service does not sign.
    #[default]
    Relayed,
}

impl fmt::Display for TransactionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Envelope => write!(f, "envelope"),
            Self::Relayed => write!(f, "relayed"),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// What an operation does. Only [`OperationKind::Transfer`] moves value
/// between two existing accounts and therefore counts as a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Value transfer from `source` to `destination`.
    Transfer,
    /// Creates and funds `destination`.
    CreateAccount,
    /// Fee or compute-budget instruction.
    Fee,
}

impl OperationKind {
    /// Returns `true` for operations the payment extractor turns into
    /// payments.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer)
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Transfer => 0,
            Self::CreateAccount => 1,
            Self::Fee => 2,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "Transfer"),
            Self::CreateAccount => write!(f, "CreateAccount"),
            Self::Fee => write!(f, "Fee"),
        }
    }
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Opaque memo bytes attached to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Memo(Vec<u8>);

impl Memo {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lossy UTF-8 view, for logs and policies that match on text memos.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for Memo {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// One instruction within a transaction.
///
/// `amount` is always an integer in the smallest unit of the chain's native
/// asset. For non-transfer kinds it is whatever the instruction carries
/// (starting balance, fee) and is never reported as a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub source: AccountId,
    pub destination: AccountId,
    pub amount: u64,
    pub memo: Option<Memo>,
}

impl Operation {
    /// A value transfer.
    pub fn transfer(source: AccountId, destination: AccountId, amount: u64) -> Self {
        Self {
            kind: OperationKind::Transfer,
            source,
            destination,
            amount,
            memo: None,
        }
    }

    /// An account creation funded by `funder`.
    pub fn create_account(funder: AccountId, account: AccountId, starting_balance: u64) -> Self {
        Self {
            kind: OperationKind::CreateAccount,
            source: funder,
            destination: account,
            amount: starting_balance,
            memo: None,
        }
    }

    /// A fee instruction paid by `payer`.
    pub fn fee(payer: AccountId, amount: u64) -> Self {
        Self {
            kind: OperationKind::Fee,
            source: payer,
            destination: payer,
            amount,
            memo: None,
        }
    }

    /// Attach a memo.
    pub fn with_memo(mut self, memo: impl Into<Memo>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Appends the canonical byte form of this operation to `buf`.
    ///
    /// Fixed-width little-endian integers and length-prefixed memo, so the
    /// encoding is unambiguous without separators.
    pub(crate) fn write_canonical(&self, buf: &mut Vec<u8>) {
        buf.push(self.kind.tag());
        buf.extend_from_slice(self.source.as_bytes());
        buf.extend_from_slice(self.destination.as_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
        match &self.memo {
            Some(memo) => {
                buf.push(0x01);
                buf.extend_from_slice(&(memo.len() as u32).to_le_bytes());
                buf.extend_from_slice(memo.as_bytes());
            }
            None => buf.push(0x00),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Deterministic transaction identifier.
///
/// 32 bytes for the envelope family, 64 bytes for the relayed family.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Vec<u8>);

impl TransactionId {
    pub(crate) fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
