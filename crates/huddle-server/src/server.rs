//! HTTP server assembly and lifecycle.

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use huddle_core::filter::WordListFilter;
use huddle_core::{EventRouter, UserRegistry};

use crate::config::Config;
use crate::connections::WsConnections;
use crate::ws;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Event router over the shared registry
    pub router: Arc<EventRouter<WsConnections>>,
    /// Live WebSocket connections
    pub connections: WsConnections,
    /// The registry, for health reporting
    pub registry: Arc<UserRegistry>,
}

impl AppState {
    /// Wire up the registry, transport, and router from configuration.
    pub fn new(config: &Config) -> Self {
        let registry = Arc::new(UserRegistry::new());
        let connections = WsConnections::new(registry.clone());

        let mut filter = WordListFilter::with_default_words();
        filter.extend(config.deny_words.iter().cloned());

        let router = Arc::new(EventRouter::new(
            registry.clone(),
            connections.clone(),
            Arc::new(filter),
        ));

        Self {
            router,
            connections,
            registry,
        }
    }
}

/// Start the HTTP server and serve until shutdown.
pub async fn start(config: Config) -> Result<()> {
    let state = AppState::new(&config);
    let app = create_router(state);

    let addr = config.socket_addr();
    info!("Starting Axum HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the Axum router with all routes and middleware.
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": state.connections.connection_count(),
        "users": state.registry.user_count().await,
    }))
}

/// Resolve when SIGINT is received.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
