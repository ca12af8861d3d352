//! # CLI Interface
//!
//! Defines the command-line argument structure for `paygate-node` using
//! `clap` derive. Supports three subcommands: `run`, `init`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use paygate_protocol::config::{DEFAULT_API_PORT, DEFAULT_METRICS_PORT};
use paygate_protocol::crypto::AccountId;

use crate::logging::LogFormat;

/// Paygate sign-transaction webhook.
///
/// Decodes transactions and their invoices, applies the configured payment
/// policy, and co-signs approved envelope transactions with the service key.
#[derive(Parser, Debug)]
#[command(
    name = "paygate-node",
    about = "Paygate sign-transaction webhook",
    version,
    propagate_version = true
)]
pub struct PaygateCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the paygate binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server.
    Run(RunArgs),
    /// Create the data directory and generate a service key.
    Init(InitArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Directory holding `service.key`.
    #[arg(long, short = 'd', env = "PAYGATE_DATA_DIR", default_value = ".paygate")]
    pub data_dir: PathBuf,

    /// Port for the webhook API.
    #[arg(long, env = "PAYGATE_PORT", default_value_t = DEFAULT_API_PORT)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "PAYGATE_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Hex-encoded Ed25519 service secret key.
    ///
    /// If not provided, the node reads `service.key` from the data directory.
    /// Without either, approvals are returned without a co-signature.
    #[arg(long, env = "PAYGATE_SERVICE_KEY")]
    pub service_key: Option<String>,

    /// Base58 account that payments may be sent to. Repeatable. When none
    /// are given, any destination is accepted.
    #[arg(long = "allow-destination", value_name = "ACCOUNT")]
    pub allow_destinations: Vec<AccountId>,

    /// SKU that invoice line items may reference. Repeatable. When none are
    /// given, SKUs are not checked.
    #[arg(long = "known-sku", value_name = "SKU")]
    pub known_skus: Vec<String>,

    /// Log output format.
    #[arg(long, env = "PAYGATE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "PAYGATE_DATA_DIR", default_value = ".paygate")]
    pub data_dir: PathBuf,

    /// Overwrite an existing service key.
    #[arg(long)]
    pub force: bool,
}
