//! Seat-lock server: real-time seat reservation locks over WebSocket.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use seatlock_api::{AppState, build_router};
use seatlock_core::config::AppConfig;
use seatlock_core::error::AppError;
use seatlock_core::traits::{Clock, LockTable, SystemClock};
use seatlock_locks::{LockCoordinator, MemoryLockTable};
use seatlock_realtime::RealtimeEngine;
use seatlock_worker::{ExpirySweeper, SweepScheduler};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "seatlock-server", version, about = "Real-time seat lock server")]
struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Environment overlay to load (`{config_dir}/{env}.toml`)
    #[arg(long, env = "SEATLOCK_ENV", default_value = "development")]
    env: String,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration files and apply command-line overrides
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load(&cli.config_dir, &cli.env)?;

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    Ok(config)
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
                .with_thread_ids(true)
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
    tracing::info!("Starting seat-lock server v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Lock table + coordinator ─────────────────────────────────
    let table: Arc<dyn LockTable> = Arc::new(MemoryLockTable::new());
    let coordinator = Arc::new(LockCoordinator::new(table, config.locks.timeout()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // ── Real-time engine ─────────────────────────────────────────
    let engine = RealtimeEngine::new(
        Arc::clone(&coordinator),
        Arc::clone(&clock),
        config.realtime.clone(),
        config.locks.release_on_disconnect,
    );

    // ── Expiry sweeper ───────────────────────────────────────────
    let sweeper = Arc::new(ExpirySweeper::new(
        Arc::clone(&coordinator),
        engine.announcer(),
        Arc::clone(&clock),
        config.locks.sweep_interval(),
    ));
    let scheduler = SweepScheduler::new().await?;
    scheduler.register_sweeper(sweeper).await?;
    scheduler.start().await?;
    tracing::info!(
        timeout_seconds = config.locks.timeout_seconds,
        sweep_interval_seconds = config.locks.sweep_interval_seconds,
        "Expiry sweeper started"
    );

    // ── HTTP server ──────────────────────────────────────────────
    let app = build_router(AppState::new(Arc::clone(&config), engine.clone()));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Seat-lock server listening on {}", addr);

    let shutdown_engine = engine.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        if let Err(e) = shutdown_engine.shutdown().await {
            tracing::warn!("Engine shutdown failed: {}", e);
        }
    });

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let served = async {
        server
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))
    };
    tokio::pin!(served);

    // Drain in-flight requests, but no longer than the grace period once
    // shutdown has begun.
    let mut engine_shutdown = engine.shutdown_receiver();
    tokio::select! {
        result = &mut served => result?,
        _ = engine_shutdown.recv() => {
            match tokio::time::timeout(grace, &mut served).await {
                Ok(result) => result?,
                Err(_) => tracing::warn!("Graceful shutdown timed out after {:?}", grace),
            }
        }
    }

    // ── Background tasks ─────────────────────────────────────────
    scheduler.shutdown().await?;

    tracing::info!("Seat-lock server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
