//! Prefix Gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 PREFIX GATEWAY                │
//!   Client Request      │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ routing  │──▶│   mount    │  │
//!                       │  │ server │   │ (sealed) │   │   group    │  │
//!                       │  └────────┘   └──────────┘   └─────┬──────┘  │
//!                       │                                    ▼         │
//!   Client Response     │  ┌────────┐                 ┌────────────┐   │
//!   ◀───────────────────┼──│response│◀────────────────│  upstream  │◀──┼── asset / url / ...
//!                       │  └────────┘                 └────────────┘   │    services
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use prefix_gateway::config::{load_config, GatewayConfig};
use prefix_gateway::lifecycle::{signals, startup, Shutdown};
use prefix_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "prefix-gateway")]
#[command(about = "Dispatch HTTP requests to handler groups by path prefix", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in mounts are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration, print the mount table and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if cli.check {
        let mounts = startup::build_mount_router(&config)?;
        for binding in mounts.bindings() {
            println!("{:<16} -> {}", binding.prefix(), binding.handlers().name());
        }
        return Ok(());
    }

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        mounts = config.mounts.len(),
        "prefix-gateway starting"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    if let Err(e) = startup::run(config, &shutdown).await {
        tracing::error!(error = %e, "Gateway failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
