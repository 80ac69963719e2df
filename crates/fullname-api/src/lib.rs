//! # fullname-api — Axum API Service
//!
//! Serves one schema-validated endpoint, `POST /api/name`, plus its OpenAPI
//! document and health probes.
//!
//! ## API Surface
//!
//! | Path                 | Module              | Auth              |
//! |----------------------|---------------------|-------------------|
//! | `/api/name`          | [`routes::name`]    | bearer, if configured |
//! | `/openapi.json`      | [`openapi`]         | none              |
//! | `/health/liveness`   | this module         | none              |
//! | `/health/readiness`  | this module         | none              |
//!
//! ## Architecture
//!
//! Endpoints implement [`endpoint::Endpoint`] and are wrapped in a
//! [`endpoint::TypedEndpoint`], which compiles their schemas once and runs
//! the validate → compute → validate → cast → serialize pipeline for every
//! request. Schemas come from `fullname-schema` and feed both the validators
//! and the OpenAPI document.
//!
//! ## Middleware Stack
//!
//! TraceLayer → AuthMiddleware (`/api/*` only) → Handler

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;

/// Assemble the application router.
///
/// Health probes and `/openapi.json` are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::name::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(Extension(auth_config));

    let unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(openapi::router());

    Router::new()
        .merge(unauthenticated)
        .merge(api)
        .layer(DefaultBodyLimit::max(endpoint::MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
///
/// # Errors
///
/// Returns [`AppError`] if the state cannot be built or the listener fails.
pub async fn serve(config: AppConfig) -> Result<(), AppError> {
    let addr = config.bind_addr();
    let auth_enabled = config.auth_token.is_some();
    let state = AppState::with_config(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, auth_enabled, "fullname-api listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("fullname-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

/// Liveness probe: 200 while the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. An [`AppState`] only exists once every endpoint has its
/// validators compiled, so serving this route at all means ready.
async fn readiness() -> &'static str {
    "ready"
}
