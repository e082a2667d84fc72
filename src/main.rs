//! Commander server
//!
//! Bridges a message bus to industrial device backends: consumes
//! command/read/write requests, executes them against the configured
//! backend, and publishes correlated responses.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commander::Config;
use commander::dispatch::Bridge;

/// Commander - remote device command bridge
#[derive(Parser, Debug)]
#[command(name = "commander")]
#[command(about = "Remote command/read/write bridge between a message bus and field devices", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "commander.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("commander=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting commander v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config)?;

    // A failed connect is logged and the process stays up without a worker.
    let _bridge = match Bridge::start(&config) {
        Ok(bridge) => Some(bridge),
        Err(e) => {
            error!("Failed to start bridge: {}", e);
            None
        }
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
