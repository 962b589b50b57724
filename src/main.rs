//! Ledger gateway service (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌────────────────────────────────────────────────────┐
//!                          │                  GATEWAY SERVICE                   │
//!                          │                                                    │
//!     POST/GET             │  ┌─────────┐    ┌──────────────┐    ┌───────────┐  │
//!     ─────────────────────┼─▶│  http   │───▶│ transaction  │───▶│  session  │──┼──▶ Network
//!                          │  │ routes  │    │   service    │    │  manager  │  │    (SDK)
//!                          │  └─────────┘    └──────┬───────┘    └─────┬─────┘  │
//!                          │                        │                  │        │
//!                          │                        ▼                  ▼        │
//!     Envelope             │                 ┌────────────┐    ┌─────────────┐  │
//!     ◀────────────────────┼─────────────────│  envelope  │◀───│ dispatcher  │  │
//!                          │                 └────────────┘    └─────────────┘  │
//!                          │                                                    │
//!                          │  config · org directory · wallets · observability  │
//!                          └────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use fabric_dispatch::config::{load_config, GatewayConfig};
use fabric_dispatch::lifecycle::{signals, startup, Shutdown};
use fabric_dispatch::observability::{logging, metrics};
use fabric_dispatch::HttpServer;

#[derive(Parser)]
#[command(name = "fabric-dispatch")]
#[command(about = "HTTP gateway for ledger contract invocations", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("fabric-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        organizations = config.organizations.len(),
        request_timeout_secs = config.timeouts.request_secs,
        commit_timeout_secs = config.network.commit_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = Arc::new(startup::build_devnet_service(&config)?);

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let tls_enabled = config.listener.tls.is_some();
    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let server = HttpServer::new(config, service);

    if tls_enabled {
        server.run_tls(addr, shutdown.subscribe()).await?;
    } else {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening for connections");
        server.run(listener, shutdown.subscribe()).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
