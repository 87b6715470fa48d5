//! Lightstrip HTTP Surface
//!
//! HTTP layer for the broadcast server, built with Axum.
//!
//! # Endpoints
//!
//! ## Strip
//! - `GET /api/v1/strip` - Snapshot of the strip
//! - `GET /api/v1/strip/layout` - Element positions
//! - `PUT /api/v1/strip/bends` - Replace bends
//! - `POST /api/v1/strip/bends` - Append a bend
//! - `PUT /api/v1/strip/color-setup` - Replace the color setup
//! - `POST /api/v1/strip/fill` - Set every LED
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## Static
//! - `GET /kitchen-sink` - Bundled demo page
//!
//! ## Broadcast
//! - any other path - websocket upgrade for control messages, otherwise
//!   an event-stream subscription
//!
//! # Example
//!
//! ```rust,ignore
//! use lightstrip::api::{serve, AppState};
//! use lightstrip::broadcast::SubscriberHub;
//! use lightstrip::config::ServerConfig;
//! use lightstrip::strip::{StripConfig, StripEngine, StripState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let hub = Arc::new(SubscriberHub::default());
//!     let state = StripState::new(StripConfig::new(100.0, 10, 10))?;
//!     let (engine, strip) = StripEngine::new(state, Arc::clone(&hub));
//!     engine.spawn();
//!
//!     serve(AppState::new(strip, hub, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::broadcast::stream_handler;
use crate::config::ServerConfig;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/strip", get(routes::strip::get_strip))
        .route("/strip/layout", get(routes::strip::get_layout))
        .route(
            "/strip/bends",
            put(routes::strip::set_bends).post(routes::strip::add_bend),
        )
        .route("/strip/color-setup", put(routes::strip::set_color_setup))
        .route("/strip/fill", post(routes::strip::fill));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .route("/kitchen-sink", get(routes::assets::kitchen_sink))
        .fallback(stream_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Lightstrip listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Lightstrip shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
