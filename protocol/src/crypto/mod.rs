//! # Cryptographic Primitives
//!
//! Thin wrappers over audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for the service co-signature and for
//!   verifying account signatures.
//! - **SHA-256** (`sha2`) for envelope transaction IDs.

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_array};
pub use keys::{AccountId, AccountIdError, KeyError, ServiceKeypair};
