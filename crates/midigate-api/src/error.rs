//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use midigate_backend::BackendError;
use midigate_queue::QueueError;
use midigate_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Job queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) | ApiError::Storage(_) => StatusCode::BAD_GATEWAY,
            ApiError::Queue(e) => match e {
                QueueError::JobFailed { .. }
                | QueueError::Timeout { .. }
                | QueueError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Backend(e) => e
                .upstream_status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }

    /// Human-readable summary for the `error` field.
    fn summary(&self) -> &'static str {
        match self {
            ApiError::MissingFile => "No file uploaded",
            ApiError::BadRequest(_) => "Invalid request",
            ApiError::PayloadTooLarge(_) => "Upload too large",
            ApiError::Internal(_) => "Internal error",
            ApiError::Unavailable(_) => "Backend unavailable",
            ApiError::Io(_) => "Failed to store upload",
            ApiError::Storage(_) => "Failed to stage upload",
            ApiError::Queue(e) => match e {
                QueueError::Submission(_) => "Failed to submit job",
                QueueError::JobFailed { .. } => "Job failed",
                QueueError::Timeout { .. } => "Job timed out",
                QueueError::MissingResult(_) => "Job returned no result",
                QueueError::ResultFetch(_) => "Failed to fetch result",
                _ => "Job queue request failed",
            },
            ApiError::Backend(_) => "Backend request failed",
        }
    }

    fn details(&self) -> Value {
        match self {
            ApiError::Queue(e) => e.details(),
            ApiError::Storage(e) => Value::String(e.to_string()),
            ApiError::Backend(e) => Value::String(e.to_string()),
            other => Value::String(other.to_string()),
        }
    }
}

/// JSON error envelope.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    details: Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = %status, "{}", self);
        } else {
            warn!(status = %status, "{}", self);
        }

        let body = ErrorResponse {
            error: self.summary(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}
