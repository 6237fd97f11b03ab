//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the REST and streaming handlers
//! - Wire up middleware (tracing, CORS, request timeout)
//! - Bind server to listener with graceful shutdown

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{BoxError, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use kubeview_k8s::KubeClient;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::{handlers, stream};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub kube: KubeClient,
    pub default_tail_lines: i64,
    pub stream_interval: Duration,
}

impl AppState {
    pub fn new(kube: KubeClient, config: &ServerConfig) -> Self {
        Self {
            kube,
            default_tail_lines: config.default_tail_lines,
            stream_interval: config.stream_interval(),
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server over an already connected cluster client.
    pub fn new(config: ServerConfig, kube: KubeClient) -> Self {
        let state = AppState::new(kube, &config);
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// The timeout only wraps the REST routes; a log stream stays open for as
/// long as the upstream keeps producing lines. An elapsed timeout is reported
/// like any other upstream failure.
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    let timeout = config.request_timeout();
    let rest = Router::new()
        .route("/api/namespaces", get(handlers::list_namespaces))
        .route("/api/pods", get(handlers::list_pods))
        .route("/api/containers", get(handlers::list_containers))
        .route("/api/logs", get(handlers::get_logs))
        .route("/healthz", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    ApiError::from_middleware(err, timeout)
                }))
                .layer(TimeoutLayer::new(timeout)),
        );

    Router::new()
        .route("/api/logs/stream", get(stream::stream_logs))
        .merge(rest)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy from the configured origins.
///
/// A wildcard origin cannot be combined with credentials, so credentials are
/// only allowed for an explicit origin list.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list([Method::GET, Method::OPTIONS]))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
