//! # Bearer Authentication
//!
//! The OpenAPI document declares a `BearerAuth` scheme for every operation.
//! Enforcement lives here, in front of the endpoint pipeline, and only when a
//! token is configured (`FULLNAME_AUTH_TOKEN`). Endpoint handlers never look
//! at credentials.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// A secret that never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Constant-time comparison against a presented credential.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}

/// Auth settings injected as a request extension.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token; `None` disables the check.
    pub token: Option<SecretString>,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    } else {
        None
    }
}

/// Reject requests without the configured bearer token.
pub async fn auth_middleware(
    Extension(config): Extension<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = &config.token else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    match presented {
        Some(token) if expected.matches(token) => next.run(request).await,
        Some(_) => AppError::Unauthorized("invalid bearer token".into()).into_response(),
        None => AppError::Unauthorized("missing bearer token".into()).into_response(),
    }
}
