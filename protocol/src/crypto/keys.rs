//! # Key Management
//!
//! Ed25519 keys for the webhook service and the accounts it sees in
//! transactions.
//!
//! Both transaction families identify accounts by their raw 32-byte Ed25519
//! public key, so [`AccountId`] doubles as the verifying key. The service
//! holds exactly one [`ServiceKeypair`], used by the signing gate to
//! co-sign envelope transactions.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - Key generation uses `OsRng`.
//! - Secret bytes are never logged and never appear in `Debug` output.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{PUBLIC_KEY_LENGTH, SIGNATURE_HINT_LENGTH, SIGNATURE_LENGTH, SIGNING_KEY_LENGTH};

/// Errors that can occur while loading key material.
///
/// Deliberately vague about the failure; key material does not belong in
/// error messages.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: expected 32 hex-encoded bytes")]
    InvalidSecretKey,
}

/// Errors from parsing a textual account ID.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("account id is not valid base58: {0}")]
    InvalidBase58(String),

    #[error("account id must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An on-chain account: the raw Ed25519 public key of its owner.
///
/// Displayed and parsed as base58, which is what operators paste into
/// allowlists and what shows up in logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId([u8; PUBLIC_KEY_LENGTH]);

impl AccountId {
    /// Wraps raw public key bytes. No curve-point validation happens here;
    /// decoders accept any 32 bytes and verification simply fails later.
    pub const fn new(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// The trailing bytes envelope transactions use to tag a signature with
    /// its signer.
    pub fn signature_hint(&self) -> [u8; SIGNATURE_HINT_LENGTH] {
        let mut hint = [0u8; SIGNATURE_HINT_LENGTH];
        hint.copy_from_slice(&self.0[PUBLIC_KEY_LENGTH - SIGNATURE_HINT_LENGTH..]);
        hint
    }

    /// Verify an Ed25519 signature made by this account.
    ///
    /// Returns `false` for malformed keys, signatures of the wrong length,
    /// and plain verification failures alike.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig_bytes: [u8; SIGNATURE_LENGTH] = match signature.try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Base58 rendering.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_base58())
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| AccountIdError::InvalidBase58(e.to_string()))?;
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AccountIdError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// ServiceKeypair
// ---------------------------------------------------------------------------

/// The key this service co-signs with.
///
/// Intentionally not `Serialize`: exporting the secret is an explicit call
/// to [`secret_key_bytes`](Self::secret_key_bytes).
pub struct ServiceKeypair {
    signing_key: SigningKey,
}

impl ServiceKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte seed. Tests and fixtures use
    /// this; production keys come from [`generate`](Self::generate).
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Load a keypair from a hex-encoded secret key, as written by
    /// `paygate-node init` or passed via `PAYGATE_SERVICE_KEY`.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; SIGNING_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// The account this keypair controls.
    pub fn account_id(&self) -> AccountId {
        AccountId(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Ed25519 is deterministic: same key and message,
    /// same signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Exports the raw 32-byte secret. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; SIGNING_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }
}

impl Clone for ServiceKeypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for ServiceKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material.
        write!(f, "ServiceKeypair(pub={})", self.account_id())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
