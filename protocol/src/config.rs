//! # Protocol Configuration & Constants
//!
//! Every limit the webhook core enforces lives here. Decoders, the signing
//! gate and the node all read from this module instead of hardcoding their
//! own copies.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Version of the webhook contract this crate implements.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 signing key (seed) length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Public key length in bytes. Account IDs are raw public keys.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Number of trailing public key bytes used as a signature hint on
/// envelope transactions.
pub const SIGNATURE_HINT_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// Transaction Identifiers
// ---------------------------------------------------------------------------

/// Envelope transactions are identified by the SHA-256 of their signable
/// payload.
pub const ENVELOPE_ID_LENGTH: usize = 32;

/// Relayed transactions are identified by the fee payer's signature.
pub const RELAYED_ID_LENGTH: usize = SIGNATURE_LENGTH;

// ---------------------------------------------------------------------------
// Decoder Limits
// ---------------------------------------------------------------------------

/// Maximum decoded transaction size in bytes. Anything larger is rejected
/// before bincode sees it.
pub const MAX_TX_SIZE_BYTES: usize = 64 * 1024;

/// Maximum decoded invoice-list size in bytes.
pub const MAX_INVOICE_LIST_SIZE_BYTES: usize = 256 * 1024;

/// Maximum number of operations a single transaction may carry.
pub const MAX_TX_OPERATIONS: usize = 256;

/// Maximum number of invoices in one invoice list.
pub const MAX_INVOICES: usize = 100;

/// Maximum number of line items per invoice.
pub const MAX_LINE_ITEMS: usize = 1024;

/// Maximum memo length in bytes.
pub const MAX_MEMO_LENGTH: usize = 512;

// ---------------------------------------------------------------------------
// Webhook Fields
// ---------------------------------------------------------------------------

/// JSON field carrying the base64 transaction blob.
pub const TRANSACTION_FIELD: &str = "transaction";

/// JSON field carrying the optional base64 invoice-list blob.
pub const INVOICE_LIST_FIELD: &str = "invoice_list";

// ---------------------------------------------------------------------------
// Network Parameters
// ---------------------------------------------------------------------------

/// Default port for the webhook API.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 9090;
