//! # Prometheus Metrics
//!
//! Exposes decision metrics for the webhook. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Sign requests received, including malformed ones.
    pub sign_requests_total: IntCounter,
    /// Requests approved.
    pub approvals_total: IntCounter,
    /// Requests rejected by policy.
    pub rejections_total: IntCounter,
    /// Individual invoice errors reported in rejections.
    pub invoice_errors_total: IntCounter,
    /// Requests that failed before policy ran (400).
    pub malformed_requests_total: IntCounter,
    /// Requests that failed on the service side (500).
    pub server_errors_total: IntCounter,
    /// Envelopes co-signed by the service key.
    pub co_signatures_total: IntCounter,
    /// Time from body received to reply rendered, in seconds.
    pub decision_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("paygate".into()), None)?;

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let c = IntCounter::new(name, help)?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };

        let sign_requests_total =
            counter("sign_requests_total", "Total sign-transaction requests received")?;
        let approvals_total = counter("approvals_total", "Sign requests approved")?;
        let rejections_total = counter("rejections_total", "Sign requests rejected by policy")?;
        let invoice_errors_total = counter(
            "invoice_errors_total",
            "Invoice errors reported across all rejections",
        )?;
        let malformed_requests_total = counter(
            "malformed_requests_total",
            "Sign requests that failed to decode or validate",
        )?;
        let server_errors_total = counter(
            "server_errors_total",
            "Sign requests that failed after decoding, in policy or the signing gate",
        )?;
        let co_signatures_total =
            counter("co_signatures_total", "Envelope transactions co-signed")?;

        let decision_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "decision_latency_seconds",
                "Sign request decode-to-reply latency in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
            ]),
        )?;
        registry.register(Box::new(decision_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            sign_requests_total,
            approvals_total,
            rejections_total,
            invoice_errors_total,
            malformed_requests_total,
            server_errors_total,
            co_signatures_total,
            decision_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
