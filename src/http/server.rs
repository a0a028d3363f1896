//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, CORS, body limit, request ID, panics)
//! - Bind server to listener
//! - Serve until a shutdown signal or trigger arrives

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::credential::SlackToken;
use crate::http::cors::cors_layer;
use crate::http::error::{handle_panic, method_not_allowed, not_found};
use crate::http::health::health;
use crate::http::proxy::proxy_handler;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::signals::shutdown_signal;
use crate::upstream::{EndpointPolicy, SlackClient, UpstreamError};

/// Route prefix for proxied calls.
pub const PROXY_PREFIX: &str = "/slack-proxy";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: SlackClient,
    pub policy: Arc<EndpointPolicy>,
}

impl AppState {
    pub fn new(config: ProxyConfig, token: &SlackToken) -> Result<Self, UpstreamError> {
        let client = SlackClient::new(&config.upstream, token)?;
        let policy = EndpointPolicy::new(config.upstream.allowed_endpoints.iter().cloned());
        Ok(Self {
            config: Arc::new(config),
            client,
            policy: Arc::new(policy),
        })
    }
}

/// HTTP server for the Slack proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and credential.
    pub fn new(config: ProxyConfig, token: &SlackToken) -> Result<Self, UpstreamError> {
        let state = AppState::new(config, token)?;
        let config = state.config.clone();
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        let max_body_size = state.config.security.max_body_size;
        let cors_enabled = state.config.cors.enabled;

        let router = Router::new()
            .route(
                &format!("{PROXY_PREFIX}/{{*endpoint}}"),
                get(proxy_handler).post(proxy_handler),
            )
            .route("/health", get(health))
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state)
            .layer(DefaultBodyLimit::max(max_body_size))
            .layer(CatchPanicLayer::custom(handle_panic));

        let router = if cors_enabled {
            router.layer(cors_layer())
        } else {
            router
        };

        router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C, SIGTERM or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown triggered");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
