//! Concurrent API Fetcher (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               FANOUT FETCHER                 │
//!    POST /fetch         │  ┌─────────┐    ┌──────────┐                 │
//!    {"urls": [...]} ────┼─▶│  http   │───▶│  fetch   │                 │
//!                        │  │ server  │    │coordinat.│                 │
//!                        │  └─────────┘    └────┬─────┘                 │
//!                        │                      │ one task per URL      │
//!                        │          ┌───────────┼───────────┐           │
//!                        │          ▼           ▼           ▼           │
//!                        │     ┌────────┐  ┌────────┐  ┌────────┐       │      Remote
//!                        │     │ worker │  │ worker │  │ worker │◀──────┼───── servers
//!                        │     └───┬────┘  └───┬────┘  └───┬────┘       │
//!                        │         └──── shared Deadline ──┘            │
//!    [{"url","data",     │                      │                       │
//!      "error"}, ...] ◀──┼──────────────────────┘  join barrier         │
//!                        │                                              │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use fanout_fetcher::config::{load_config, validate_config, ConfigError, FetcherConfig};
use fanout_fetcher::http::HttpServer;
use fanout_fetcher::lifecycle::{shutdown_signal, Shutdown};
use fanout_fetcher::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "fanout-fetcher")]
#[command(about = "HTTP service that fetches batches of URLs concurrently", long_about = None)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => FetcherConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);
    tracing::info!("fanout-fetcher v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        timeout_ms = config.fetch.timeout_ms,
        max_urls = config.limits.max_urls,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &shutdown)?;
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
