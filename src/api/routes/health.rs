//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (strip engine is running)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 while the strip engine answers requests.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if engine_running(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engine_ok = engine_running(&state).await;

    Json(HealthResponse {
        status: if engine_ok { "healthy" } else { "unhealthy" }.to_string(),
        engine: if engine_ok { "ok" } else { "stopped" }.to_string(),
        subscribers: state.subscriber_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The engine answers a snapshot request only while it runs
async fn engine_running(state: &AppState) -> bool {
    state.strip.snapshot().await.is_some()
}
