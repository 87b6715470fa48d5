//! Data Transfer Objects
//!
//! Request and response types for the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/strip/fill`
#[derive(Debug, Clone, Deserialize)]
pub struct FillRequest {
    /// Hex color, `#rrggbb`
    pub color: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub engine: String,
    pub subscribers: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
