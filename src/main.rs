//! Pistachio server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum (request id, trace)
//!                        │
//!                        ▼
//!                     prepare ──▶ middleware ──▶ route match ──▶ actions
//!                                                                   │
//!     Client Response                                               ▼
//!     ◀────────────── answer renderer ◀── envelope ◀── payload | error route
//! ```
//!
//! Without `--config` the server answers only the built-in `/health`,
//! `/info` and `/map` routes.

use std::path::PathBuf;

use clap::Parser;

use pistachio::config::{load_config, PistachioConfig};
use pistachio::observability::logging;
use pistachio::{Capabilities, Pistachio};

#[derive(Parser, Debug)]
#[command(name = "pistachio", version, about = "Configuration-driven HTTP application server")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => PistachioConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    logging::init(&config.observability.log_level);

    tracing::info!("pistachio v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.port,
        routes = config.routes.len(),
        content_type = %config.content_type,
        "Configuration loaded"
    );

    let running = Pistachio::new(config, Capabilities::new())?.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    running.stop(|| tracing::info!("Shutdown complete")).await?;
    Ok(())
}
