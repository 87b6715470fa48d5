//! Static Asset Route
//!
//! - GET /kitchen-sink - The demo page, served verbatim
//!
//! The page is compiled into the binary. `server.asset_path` replaces it
//! with a file read on every request.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::borrow::Cow;
use std::sync::Arc;

use crate::api::state::AppState;

/// Bundled demo page
pub const KITCHEN_SINK: &[u8] = include_bytes!("../../../assets/kitchen-sink.html");

/// GET /kitchen-sink
///
/// 200 with the HTML document, or 500 with a plain-text body when the
/// configured file cannot be read.
pub async fn kitchen_sink(State(state): State<Arc<AppState>>) -> Response {
    let body = match &state.config.asset_path {
        None => Cow::Borrowed(KITCHEN_SINK),
        Some(path) => match tokio::fs::read(path).await {
            Ok(body) => Cow::Owned(body),
            Err(e) => {
                tracing::error!(path = ?path, error = %e, "Failed to read static asset");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "Internal Server Error",
                )
                    .into_response();
            }
        },
    };

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}
