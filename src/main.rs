//! Slack API proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 SLACK PROXY                  │
//!   Client Request      │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ────────────────────┼─▶│  http   │──▶│ payload  │──▶│ upstream  │──┼──▶ slack.com/api
//!                       │  │ server  │   │ decode / │   │  client   │  │
//!                       │  └─────────┘   │  repair  │   └─────┬─────┘  │
//!   Client Response     │       ▲        └──────────┘         │        │
//!   ◀───────────────────┼───────┴─────────────────────────────┘        │
//!                       │                                              │
//!                       │  config · credential · metrics · lifecycle   │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use slack_proxy::lifecycle::startup::load_credential;
use slack_proxy::lifecycle::{Cli, Shutdown, StartupError};
use slack_proxy::observability::{logging, metrics};
use slack_proxy::HttpServer;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet.
            eprintln!("slack-proxy: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    logging::init_logging(&config.observability)?;
    tracing::info!("slack-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let token = match load_credential() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Refusing to start");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.upstream.request_timeout_secs,
        repair_endpoint = %config.upstream.repair_endpoint,
        allow_list = config.upstream.allowed_endpoints.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated at load time.
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr)?;
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, &token)?;
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
