//! CredHub Server — credential issuance and registry lifecycle service.
//!
//! Wires the audit log, abuse tracker, and lifecycle scheduler together
//! and runs until interrupted. The HTTP surface lives outside this
//! binary; the crates below are its building blocks.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use credhub_auth::abuse::{AbuseCleanup, AbuseTracker, MemoryAbuseStore};
use credhub_core::AuditLog;
use credhub_core::config::AppConfig;
use credhub_core::error::AppError;
use credhub_worker::{HttpLedgerGateway, LifecycleScheduler};

#[tokio::main]
async fn main() {
    let env = std::env::var("CREDHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CredHub v{}", env!("CARGO_PKG_VERSION"));

    let audit = Arc::new(AuditLog::to_file(&config.audit.file)?);
    audit.system_event(
        "server_started",
        serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
    );

    // Abuse tracker with hourly sweep of stale records.
    let tracker = Arc::new(AbuseTracker::new(
        Arc::new(MemoryAbuseStore::new()),
        Arc::clone(&audit),
        config.abuse.clone(),
    ));
    let sweep = AbuseCleanup::new(Arc::clone(&tracker)).start(config.abuse.cleanup_interval());
    tracing::info!(
        interval_minutes = config.abuse.cleanup_interval_minutes,
        "Abuse tracker sweep scheduled"
    );

    // Lifecycle scheduler over the HTTP ledger gateway.
    let ledger = Arc::new(HttpLedgerGateway::new(&config.ledger)?);
    let scheduler = Arc::new(LifecycleScheduler::new(
        ledger,
        Arc::clone(&audit),
        config.scheduler.clone(),
    ));

    if config.scheduler.enabled {
        scheduler.start().await;
    } else {
        tracing::warn!("Lifecycle scheduler disabled by configuration");
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;

    tracing::info!("Shutdown signal received");
    scheduler.stop().await;
    sweep.shutdown().await;
    audit.system_event("server_stopped", serde_json::json!({}));

    Ok(())
}
