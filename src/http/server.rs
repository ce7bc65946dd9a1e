//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the outbound HTTP client shared by every fetch
//! - Create the axum Router with an explicit route table
//! - Wire up middleware (request ID, tracing, body limit)
//! - Serve until shutdown is triggered, then drain

use axum::{
    extract::DefaultBodyLimit,
    routing::any,
    Router,
};
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{FetchConfig, FetcherConfig, LimitsConfig};
use crate::http::handlers;
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub fetch: FetchConfig,
    pub limits: LimitsConfig,
    /// Parent scope of every batch; cancelled on shutdown.
    pub batches: CancellationToken,
}

/// HTTP server for the fetcher.
pub struct HttpServer {
    router: Router,
    timeout_ms: u64,
    shutdown: broadcast::Receiver<()>,
}

/// Build the outbound client used by all fetch workers.
///
/// No overall request timeout is set here: each batch deadline bounds its
/// fetches instead.
pub fn build_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(config.user_agent.clone());
    if let Some(connect_timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(connect_timeout);
    }
    if !config.use_env_proxy {
        builder = builder.no_proxy();
    }
    builder.build()
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Batches run under `shutdown`'s batch scope, so triggering it cancels
    /// them as well as stopping the server.
    pub fn new(config: FetcherConfig, shutdown: &Shutdown) -> Result<Self, reqwest::Error> {
        let state = AppState {
            client: build_client(&config.fetch)?,
            fetch: config.fetch.clone(),
            limits: config.limits.clone(),
            batches: shutdown.batch_scope(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            timeout_ms: config.fetch.timeout_ms,
            shutdown: shutdown.subscribe(),
        })
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &FetcherConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(handlers::home))
            .route("/fetch", any(handlers::fetch_batch))
            .fallback(handlers::home)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for serving or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until shutdown is triggered.
    ///
    /// In-flight batches are already cancelled by then (their workers report
    /// cancellation failures); the call returns once those responses have
    /// been written.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_ms = self.timeout_ms,
            "HTTP server starting"
        );

        let mut shutdown = self.shutdown;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
