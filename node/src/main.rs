// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Paygate Node
//!
//! Entry point for the `paygate-node` binary. Parses CLI arguments,
//! initializes logging and metrics, loads the service key, and serves the
//! webhook API.
//!
//! The binary supports three subcommands:
//!
//! - `run`: start the webhook server
//! - `init`: initialize data directory and generate the service key
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;
mod policy;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;

use paygate_protocol::crypto::ServiceKeypair;

use cli::{Commands, PaygateCli};
use logging::LogFormat;
use metrics::NodeMetrics;
use policy::CatalogPolicy;

/// File name of the hex-encoded service key inside the data directory.
const SERVICE_KEY_FILE: &str = "service.key";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PaygateCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the webhook API and the metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "paygate_node=info,paygate_protocol=info,tower_http=debug",
        args.log_format,
    );

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        data_dir = %args.data_dir.display(),
        "starting paygate-node"
    );

    // --- Service key ---
    let keypair = load_service_key(args.service_key.as_deref(), &args.data_dir)?;
    match &keypair {
        Some(kp) => tracing::info!(public_key = %kp.account_id(), "service key loaded"),
        None => tracing::warn!("no service key configured; approvals will not be co-signed"),
    }

    // --- Policy ---
    tracing::info!(
        destinations = args.allow_destinations.len(),
        skus = args.known_skus.len(),
        "catalog policy configured"
    );
    let policy = CatalogPolicy::new(args.allow_destinations, args.known_skus);

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            paygate_protocol::config::PROTOCOL_VERSION,
        ),
        policy: Arc::new(policy),
        keypair: keypair.map(Arc::new),
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("webhook API listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("paygate-node stopped");
    Ok(())
}

/// Resolves the service key: an explicit hex key wins, then `service.key`
/// in the data directory. Neither is not an error.
fn load_service_key(explicit: Option<&str>, data_dir: &Path) -> Result<Option<ServiceKeypair>> {
    if let Some(hex_key) = explicit {
        let kp = ServiceKeypair::from_hex(hex_key.trim()).context("invalid --service-key")?;
        return Ok(Some(kp));
    }

    let key_path = data_dir.join(SERVICE_KEY_FILE);
    if !key_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&key_path)
        .with_context(|| format!("failed to read service key from {}", key_path.display()))?;
    let kp = ServiceKeypair::from_hex(contents.trim())
        .with_context(|| format!("invalid service key in {}", key_path.display()))?;
    Ok(Some(kp))
}

/// Initializes a data directory and generates the service keypair.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging("paygate_node=info", LogFormat::Pretty);

    let key_path = write_service_key(&args.data_dir, args.force)?;
    let keypair = load_service_key(None, &args.data_dir)?
        .with_context(|| format!("service key missing after write: {}", key_path.display()))?;
    let public_key = keypair.account_id();

    tracing::info!(
        public_key = %public_key,
        key_path = %key_path.display(),
        "service keypair generated"
    );

    println!("Node initialized successfully.");
    println!("  Data directory : {}", args.data_dir.display());
    println!("  Service key    : {}", key_path.display());
    println!("  Public key     : {}", public_key);

    Ok(())
}

/// Generates a fresh key and writes it hex-encoded to `data_dir/service.key`
/// with owner-only permissions. Refuses to overwrite unless `force`.
fn write_service_key(data_dir: &Path, force: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let key_path = data_dir.join(SERVICE_KEY_FILE);
    if key_path.exists() && !force {
        bail!(
            "service key already exists at {} (use --force to replace it)",
            key_path.display()
        );
    }

    let keypair = ServiceKeypair::generate();
    std::fs::write(&key_path, hex::encode(keypair.secret_key_bytes()))
        .with_context(|| format!("failed to write service key to {}", key_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&key_path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(key_path)
}

/// Prints version information to stdout.
fn print_version() {
    println!("paygate-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol     {}", paygate_protocol::config::PROTOCOL_VERSION);
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_a_loadable_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_service_key(dir.path(), false).unwrap();

        assert_eq!(path, dir.path().join(SERVICE_KEY_FILE));
        let kp = load_service_key(None, dir.path()).unwrap();
        assert!(kp.is_some());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        write_service_key(dir.path(), false).unwrap();
        let first = std::fs::read_to_string(dir.path().join(SERVICE_KEY_FILE)).unwrap();

        assert!(write_service_key(dir.path(), false).is_err());
        write_service_key(dir.path(), true).unwrap();
        let second = std::fs::read_to_string(dir.path().join(SERVICE_KEY_FILE)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn explicit_key_wins_over_key_file() {
        let dir = tempfile::tempdir().unwrap();
        write_service_key(dir.path(), false).unwrap();

        let explicit = ServiceKeypair::from_seed(&[4u8; 32]);
        let hex_key = hex::encode(explicit.secret_key_bytes());
        let loaded = load_service_key(Some(&hex_key), dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(loaded.account_id(), explicit.account_id());
    }

    #[test]
    fn missing_key_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_service_key(None, dir.path()).unwrap().is_none());
    }

    #[test]
    fn malformed_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_service_key(Some("zz"), dir.path()).is_err());
    }
}
