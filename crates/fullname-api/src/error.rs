//! # API Error Types
//!
//! Every error body in this API has the same shape, `{"title": "..."}`,
//! matching the documented error schema. [`AppError`] covers failures
//! outside the typed-endpoint pipeline (configuration, startup, auth).
//! Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::endpoint::EndpointError;

/// JSON error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub title: String,
}

impl ErrorBody {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An endpoint could not be prepared at startup.
    #[error("endpoint setup failed: {0}")]
    Endpoint(#[from] EndpointError),

    /// Listener or filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::Config(_) | Self::Endpoint(_) | Self::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();
        match &self {
            Self::Unauthorized(_) => tracing::info!(error = %self, "request rejected"),
            _ => tracing::error!(error = %self, "internal server error"),
        }
        (status, Json(ErrorBody::new(title))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn test_error_body_serializes_title_only() {
        let json = serde_json::to_value(ErrorBody::new("Invalid body")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Invalid body"}));
    }

    #[test]
    fn test_error_display_messages() {
        assert!(AppError::Config("bad port".into()).to_string().contains("bad port"));
        assert!(AppError::Unauthorized("no token".into())
            .to_string()
            .contains("no token"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_401() {
        let (status, body) = response_parts(AppError::Unauthorized("no token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.title, "Unauthorized");
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let (status, body) = response_parts(AppError::Config("FULLNAME_PORT=abc".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.title, "Internal error");
        assert!(!body.title.contains("FULLNAME_PORT"));
    }
}
