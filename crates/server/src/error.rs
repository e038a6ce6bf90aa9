//! Unified error handling for the REST surface.
//!
//! Errors that carry a payload respond with the service-wide envelope
//! `{"status": "ERROR", "errorCode": ..., "message": ..., "data": null}`.
//! Plain not-found responses stay bodyless, matching the lookup contracts.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found (404, empty body).
    #[error("not found")]
    NotFound,

    /// Invalid request data (400).
    #[error("{0}")]
    InvalidArgument(String),

    /// Illegal state transition (409).
    #[error("{0}")]
    IllegalState(String),

    /// Unexpected failure (500).
    #[error("{0}")]
    Internal(String),
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// The REST error envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    status: &'static str,
    error_code: &'static str,
    message: String,
    data: Option<()>,
}

impl ErrorEnvelope {
    fn new(error_code: &'static str, message: String) -> Self {
        Self {
            status: "ERROR",
            error_code,
            message,
            data: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::InvalidArgument(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorEnvelope::new("INVALID_ARGUMENT", message)),
            )
                .into_response(),
            ApiError::IllegalState(message) => (
                StatusCode::CONFLICT,
                Json(ErrorEnvelope::new("ILLEGAL_STATE", message)),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!(message, "unhandled error in REST handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorEnvelope::new(
                        "INTERNAL_ERROR",
                        "An unexpected error occurred".to_string(),
                    )),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::InvalidArgument("stock id must be numeric".into());
        assert_eq!(err.to_string(), "stock id must be numeric");
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope::new("INVALID_ARGUMENT", "bad input".into());
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["status"], "ERROR");
        assert_eq!(json["errorCode"], "INVALID_ARGUMENT");
        assert_eq!(json["message"], "bad input");
        // data is an explicit null, not omitted.
        assert!(json["data"].is_null());
        assert!(json.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidArgument("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::IllegalState("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
