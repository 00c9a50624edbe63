//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: documentation surface first, proxy catch-all last
//! - Wire up middleware (tracing, request timeout, request ID)
//! - Share the registry and the outbound client with all handlers
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::docs;
use crate::forward::Forwarder;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::proxy::proxy_handler;
use crate::registry::UpstreamRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<UpstreamRegistry>,
    pub forwarder: Forwarder,
    pub config: Arc<RelayConfig>,
}

/// HTTP server for the relay gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(UpstreamRegistry::from_config(&config.upstreams));
        let forwarder = Forwarder::new(&config.client);

        let state = AppState {
            registry,
            forwarder,
            config: Arc::new(config),
        };

        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router.
    ///
    /// The gateway's own endpoints are registered explicitly so they are
    /// matched before the proxy catch-all; the registry additionally
    /// refuses their segments as upstream names.
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);
        let max_connections = state.config.listener.max_connections;

        Router::new()
            .route("/health", get(health))
            .route("/external-specs/{name}", get(docs::rewritten_spec))
            .route("/v3/api-docs", get(docs::aggregate_document))
            .route("/swagger-config/single/{name}", get(docs::config_single))
            .route("/swagger-config/group/{group}", get(docs::config_group))
            .route("/docs/{name}", get(docs::open_single))
            .route("/docs/{name}/swagger.html", get(docs::open_single))
            .route("/docs/group/{group}", get(docs::open_group))
            .route("/docs/group/{group}/swagger.html", get(docs::open_group))
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(GlobalConcurrencyLimitLayer::new(max_connections))
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}
