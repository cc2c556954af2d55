//! rollcalld - the attendance session service
//!
//! This is the main entry point for the daemon. It wires together:
//! - Configuration loading
//! - Store initialization
//! - The session materializer and clock background jobs
//! - The HTTP API

use anyhow::{Context, Result};
use clap::Parser;
use rollcall_config::{load_config, Config};
use rollcall_core::{AttendanceRecorder, SessionClock, SessionMaterializer};
use rollcall_store::SqliteStore;
use rollcall_util::default_config_path;
use rollcalld::http::{router, AppState};
use rollcalld::jobs::{ClockJob, MaterializerJob};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// rollcalld - attendance session tracking service
#[derive(Parser, Debug)]
#[command(name = "rollcalld")]
#[command(about = "Attendance session tracking service", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/rollcall/rollcall.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Listen address override
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Data directory override (or set ROLLCALL_DATA_DIR env var)
    #[arg(short, long, env = "ROLLCALL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "rollcalld starting");

    // Load configuration; a missing file at the default location just
    // means defaults.
    let mut config = if args.config.exists() {
        let config = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;
        info!(config_path = %args.config.display(), "Configuration loaded");
        config
    } else {
        warn!(config_path = %args.config.display(), "No config file found, using defaults");
        Config::default()
    };

    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    // Initialize store
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {:?}",
            config.storage.data_dir
        )
    })?;

    let db_path = config.storage.data_dir.join("rollcall.db");
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );

    info!(db_path = %db_path.display(), "Store initialized");

    // Build the engine
    let clock = Arc::new(SessionClock::new(store.clone()));
    let recorder = Arc::new(AttendanceRecorder::new(
        store.clone(),
        store.clone(),
        store.clone(),
        config.attendance.late_threshold,
    ));
    let materializer = SessionMaterializer::new(store.clone(), store.clone());

    // Background jobs
    let clock_job = Arc::new(ClockJob::new(clock.clone()));
    let clock_handle = clock_job.spawn(config.attendance.clock_interval);

    let materializer_job = Arc::new(MaterializerJob::new(materializer));
    let materializer_handle = materializer_job.spawn(config.attendance.materializer_hour);

    // HTTP server
    let state = AppState {
        store,
        recorder,
        clock,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    info!(addr = %config.server.bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down rollcalld");
    clock_handle.abort();
    materializer_handle.abort();
    info!("Shutdown complete");

    Ok(())
}

/// Resolve on SIGTERM or ctrl-c
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to create SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully");
        }
    }
}
