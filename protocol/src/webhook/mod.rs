//! # Sign-Transaction Webhook
//!
//! The decision core behind `POST /sign_transaction`.
//!
//! ## Flow
//!
//! ```text
//! SignTransactionBody ──► SignRequest (decode + extract payments)
//!                              │
//!                              ▼
//!                         SignPolicy ──► SignResponse (Pending → Approved | Rejected)
//!                                             │
//!                                   signing gate if not rejected
//!                                             │
//!                                             ▼
//!                                         SignReply (JSON)
//! ```
//!
//! Each call owns its request and response. Nothing here holds state
//! between calls.

pub mod error;
pub mod policy;
pub mod request;
pub mod response;

pub use error::WebhookError;
pub use policy::{ApproveAll, SignPolicy};
pub use request::{SignRequest, SignTransactionBody};
pub use response::{Decision, InvoiceError, InvoiceErrorReason, SignReply, SignResponse};

use tracing::{debug, info};

use crate::crypto::keys::ServiceKeypair;

/// Runs one webhook call end to end.
///
/// Decodes `body`, hands the request to `policy`, then runs the signing
/// gate with `keypair` unless the policy rejected or already signed.
/// Without a keypair the gate is skipped and approval carries no
/// co-signature. An envelope that already carries this service's
/// signature is approved as is and no envelope is returned.
pub fn handle_sign_transaction(
    body: &SignTransactionBody,
    policy: &dyn SignPolicy,
    keypair: Option<&ServiceKeypair>,
) -> Result<SignReply, WebhookError> {
    let request = SignRequest::from_body(body)?;
    let tx_id = request
        .tx_id()
        .map(|id| id.to_hex())
        .unwrap_or_else(|| "unsigned".to_string());

    debug!(
        tx_id = %tx_id,
        family = %request.family(),
        payments = request.payments().len(),
        "sign request decoded"
    );

    let mut response = SignResponse::new();
    policy.decide(&request, &mut response);

    if !response.is_rejected() && response.signed_transaction().is_none() {
        if let Some(keypair) = keypair {
            if request.transaction().is_signed_by(&keypair.account_id()) {
                // Caller already holds the co-signed envelope, e.g. a retry.
                debug!(tx_id = %tx_id, "transaction already co-signed, skipping gate");
                response.approve();
            } else {
                response.sign(&request, keypair)?;
            }
        }
    }

    for error in response.invoice_errors() {
        debug!(tx_id = %tx_id, op_index = error.op_index, reason = %error.reason, "invoice error");
    }

    let reply = response.into_reply();
    info!(
        tx_id = %tx_id,
        rejected = reply.rejected,
        co_signed = reply.envelope.is_some(),
        "sign request decided"
    );
    Ok(reply)
}
