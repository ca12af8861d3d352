//! # REST API
//!
//! Builds the axum router that exposes the webhook's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                | Description                          |
//! |--------|---------------------|--------------------------------------|
//! | GET    | `/health`           | Liveness probe                       |
//! | GET    | `/status`           | Service key and supported families   |
//! | POST   | `/sign_transaction` | Decide on, and co-sign, a transaction |
//!
//! `POST /sign_transaction` answers 200 with the reply body on approval,
//! 403 with the same body shape on rejection, 400 for malformed input and
//! 500 when signing fails.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use paygate_protocol::crypto::ServiceKeypair;
use paygate_protocol::transaction::TransactionFamily;
use paygate_protocol::webhook::{
    handle_sign_transaction, SignPolicy, SignReply, SignTransactionBody, WebhookError,
};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Business policy applied to every request.
    pub policy: Arc<dyn SignPolicy>,
    /// Service key for the signing gate. `None` disables co-signing.
    pub keypair: Option<Arc<ServiceKeypair>>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the axum [`Router`] with all API routes and request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/sign_transaction", post(sign_transaction_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Base58 service public key, if a key is loaded.
    pub service_public_key: Option<String>,
    /// Transaction families `/sign_transaction` accepts.
    pub families: Vec<TransactionFamily>,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Generic error body returned on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: returns 200 if the node is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status`: returns the node's signing configuration.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        version: state.version.clone(),
        service_public_key: state.keypair.as_ref().map(|k| k.account_id().to_base58()),
        families: vec![TransactionFamily::Envelope, TransactionFamily::Relayed],
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `POST /sign_transaction`: runs the webhook pipeline.
async fn sign_transaction_handler(
    State(state): State<AppState>,
    body: Result<Json<SignTransactionBody>, JsonRejection>,
) -> Response {
    let metrics = &state.metrics;
    metrics.sign_requests_total.inc();
    let _timer = metrics.decision_latency_seconds.start_timer();

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            metrics.malformed_requests_total.inc();
            tracing::warn!(error = %rejection.body_text(), "unreadable sign request body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let result = handle_sign_transaction(&body, state.policy.as_ref(), state.keypair.as_deref());
    match result {
        Ok(reply) => reply_response(metrics, reply),
        Err(e) if e.is_client_error() => {
            metrics.malformed_requests_total.inc();
            tracing::warn!(error = %e, "rejected malformed sign request");
            error_response(StatusCode::BAD_REQUEST, e)
        }
        Err(e) => failure_response(metrics, e),
    }
}

fn failure_response(metrics: &SharedMetrics, error: WebhookError) -> Response {
    metrics.server_errors_total.inc();
    tracing::error!(error = %error, "sign request failed");
    error_response(status_for(&error), error)
}

fn reply_response(metrics: &SharedMetrics, reply: SignReply) -> Response {
    if reply.rejected {
        let errors = reply.invoice_errors.as_ref().map_or(0, Vec::len);
        metrics.rejections_total.inc();
        metrics.invoice_errors_total.inc_by(errors as u64);
        (StatusCode::FORBIDDEN, Json(reply)).into_response()
    } else {
        metrics.approvals_total.inc();
        if reply.envelope.is_some() {
            metrics.co_signatures_total.inc();
        }
        (StatusCode::OK, Json(reply)).into_response()
    }
}

fn status_for(error: &WebhookError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
