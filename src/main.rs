//! AudioMatrix GW - Rust implementation
//!
//! Gateway keeping a live mirror of a text-protocol audio routing matrix for
//! control surfaces.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audiomatrix_gw::adapter::MatrixAdapter;
use audiomatrix_gw::cli;
use audiomatrix_gw::config::{AppConfig, ConfigError, DeviceConfig};
use audiomatrix_gw::surface::ConsoleSurface;

/// AudioMatrix Gateway - mirror and control a text-protocol audio matrix
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Device host (overrides config file)
    #[arg(long, env = "MATRIX_HOST")]
    host: Option<String>,

    /// Device port (overrides config file)
    #[arg(long, env = "MATRIX_PORT")]
    port: Option<u16>,

    /// Run without the interactive console (until Ctrl+C)
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    info!("Starting AudioMatrix GW...");
    info!("Configuration file: {}", args.config);

    let device = resolve_device_config(&args).await?;
    if !device.is_complete() {
        warn!("Device host/port not configured; waiting for configuration");
    }

    let adapter = Arc::new(MatrixAdapter::new(Arc::new(ConsoleSurface::new())));
    adapter.init(device).await;

    if args.headless {
        shutdown_signal().await;
    } else {
        cli::run_repl(adapter.clone()).await?;
    }

    adapter.destroy().await;
    info!("AudioMatrix GW shutdown complete");
    Ok(())
}

/// Merge the config file (if present) with CLI/env overrides
async fn resolve_device_config(args: &Args) -> Result<DeviceConfig> {
    let mut device = match AppConfig::load(&args.config).await {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config.device
        }
        Err(ConfigError::Read { ref source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            warn!("Config file {} not found, using defaults", args.config);
            DeviceConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(host) = &args.host {
        device.host = host.clone();
    }
    if let Some(port) = args.port {
        device.port = port;
    }
    Ok(device)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
