//! Error handling for route handlers

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deepfake_detector::DetectError;
use serde_json::json;

/// Errors a handler can return. Rendered as `{"detail": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingInput,

    #[error("Invalid multipart body: {0}")]
    BadMultipart(String),

    #[error("Upload exceeds the size limit")]
    UploadTooLarge,

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error("Video analysis timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::MissingInput => (StatusCode::BAD_REQUEST, "MISSING_INPUT", self.to_string()),
            ApiError::BadMultipart(_) => {
                (StatusCode::BAD_REQUEST, "BAD_MULTIPART", self.to_string())
            }
            ApiError::UploadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "UPLOAD_TOO_LARGE", self.to_string())
            }
            ApiError::Detect(DetectError::UnreadableVideo) => (
                StatusCode::BAD_REQUEST,
                "UNREADABLE_VIDEO",
                DetectError::UnreadableVideo.to_string(),
            ),
            ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", self.to_string()),
            ApiError::Detect(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, detail) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::warn!(error = %self, code, "Request rejected");
        }

        (status, Json(json!({ "detail": detail, "code": code }))).into_response()
    }
}

/// Extension trait for logging errors and converting to [`ApiError::Internal`]
pub trait LogErr<T> {
    /// Log error with context and return an internal error
    fn log_internal(self, context: &str) -> ApiResult<T>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_internal(self, context: &str) -> ApiResult<T> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", context);
            ApiError::Internal(context.to_string())
        })
    }
}
