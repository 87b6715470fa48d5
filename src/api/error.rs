//! API Error Types
//!
//! Failures of the HTTP surface and the status each one maps to. Every
//! error body carries a fresh request id so a client report can be matched
//! with the server log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::broadcast::HubError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected bend, color setup or color in a request body
    #[error("Invalid strip request: {0}")]
    Validation(String),

    /// The strip engine task has ended and accepts no more commands
    #[error("Strip engine is not running")]
    EngineStopped,

    /// The subscriber hub refused a new push-stream client
    #[error(transparent)]
    Subscriber(#[from] HubError),

    /// Binding or serving the listener failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_STRIP_REQUEST"),
            ApiError::EngineStopped => (StatusCode::SERVICE_UNAVAILABLE, "ENGINE_STOPPED"),
            ApiError::Subscriber(_) => (StatusCode::SERVICE_UNAVAILABLE, "SUBSCRIBER_REJECTED"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_IO"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        // Bad input is the client's problem, not the server's
        if status.is_client_error() {
            tracing::warn!(request_id = %request_id, code, error = %self, "Rejected request");
        } else {
            tracing::error!(request_id = %request_id, code, error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
