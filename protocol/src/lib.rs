// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Paygate Protocol: Core Library
//!
//! The decision core of a payment-signing webhook. A caller posts a
//! transaction and, optionally, the invoices behind its transfers; paygate
//! decodes both, lines invoices up with transfers, lets business policy
//! approve or reject individual payments, and co-signs the transaction when
//! its family calls for it.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants (size limits, key and ID lengths, ports).
//! - **crypto**: Ed25519 service keys, account IDs, SHA-256.
//! - **transaction**: Both transaction families, their codec and the signing gate.
//! - **invoice**: Invoice lists and their validation.
//! - **payment**: Correlates invoices with transfer operations.
//! - **webhook**: Sign request/response, policy seam and the reply format.
//!
//! ## Design Philosophy
//!
//! 1. Decoding is strict. A blob either decodes and validates or the call
//!    fails before policy runs.
//! 2. Rejection is final. Nothing moves a response out of `Rejected`.
//! 3. Operation indexes always refer to the full, unfiltered operation list.
//! 4. If it touches money, it has tests.

pub mod config;
pub mod crypto;
pub mod invoice;
pub mod payment;
pub mod transaction;
pub mod webhook;
