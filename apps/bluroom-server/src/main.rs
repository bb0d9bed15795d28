//! Bluroom Server - Standalone headless server for BluOS room discovery.
//!
//! Serves discovered players, resolved rooms and playback passthroughs over
//! HTTP so a web UI can drive Bluesound players on the local network.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bluroom_core::{bootstrap_services, start_server, AppState};
use clap::Parser;
use tokio::signal;

use crate::config::ServerConfig;

/// Bluroom Server - Headless BluOS discovery and room topology server.
#[derive(Parser, Debug)]
#[command(name = "bluroom-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "BLUROOM_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Bind port (overrides config file).
    #[arg(short = 'p', long, env = "BLUROOM_BIND_PORT")]
    port: Option<u16>,

    /// Data directory for persistent state (known devices).
    #[arg(short = 'd', long, env = "BLUROOM_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Bluroom Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }

    log::info!(
        "Configuration: bind_port={}, sweep={}ms, probe_timeout={}ms, cache_ttl={}s",
        config.bind_port,
        config.sweep_duration_ms,
        config.probe_timeout_ms,
        config.cache_ttl_secs
    );

    let core_config = config.to_core_config();
    let services = bootstrap_services(&core_config, config.data_dir.as_deref())
        .context("Failed to bootstrap services")?;

    log::info!("Services bootstrapped successfully");

    if core_config.warm_up_on_start {
        services.spawn_warm_up();
    }

    let app_state = AppState::new(&services);

    start_server(app_state, config.bind_port, shutdown_signal())
        .await
        .with_context(|| format!("HTTP server failed on port {}", config.bind_port))?;

    log::info!("Shutdown signal received, cleaning up...");

    services.shutdown();

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
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
                log::error!("Failed to install SIGTERM handler: {}", e);
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
