//! OpenAPI Relay Gateway
//!
//! A reverse proxy built with Tokio and Axum that fronts named upstream
//! HTTP APIs and serves their OpenAPI/Swagger documents rewritten to
//! resolve through the gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 RELAY GATEWAY                  │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ registry │──▶│    proxy    │──┼──▶ Upstream
//!                    │  │ server │   │  lookup  │   │  (headers,  │  │
//!                    │  └────────┘   └──────────┘   │  location)  │  │
//!   Client Response  │                              └──────┬──────┘  │
//!   ◀────────────────┼─────────────────────────────────────┘         │
//!                    │  ┌──────────────────────────────────────────┐ │
//!                    │  │ docs: fetch → rewrite → merge → serve    │ │
//!                    │  └──────────────────────────────────────────┘ │
//!                    │  ┌──────────────────────────────────────────┐ │
//!                    │  │ cross-cutting: config, observability,    │ │
//!                    │  │ lifecycle, shared outbound client        │ │
//!                    │  └──────────────────────────────────────────┘ │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use openapi_relay::config::{load_config, RelayConfig};
use openapi_relay::http::HttpServer;
use openapi_relay::lifecycle::{wait_for_signal, Shutdown};
use openapi_relay::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "openapi-relay", about = "Reverse proxy with OpenAPI rewriting and aggregation")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstreams = config.upstreams.len(),
        passthrough = config.passthrough.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
