//! # Application State
//!
//! Configuration and the compiled endpoints shared by all handlers. The
//! state is built once at startup and cloned cheaply into each request;
//! everything inside is read-only.

use std::sync::Arc;

use crate::auth::SecretString;
use crate::endpoint::{EndpointDefinition, TypedEndpoint};
use crate::error::AppError;
use crate::routes::name::NameEndpoint;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on `/api/*`; `None` leaves the API open.
    pub auth_token: Option<SecretString>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            auth_token: None,
        }
    }
}

impl AppConfig {
    /// Read `FULLNAME_HOST`, `FULLNAME_PORT` and `FULLNAME_AUTH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when `FULLNAME_PORT` is not a valid port.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when the port value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let host = lookup("FULLNAME_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("FULLNAME_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AppError::Config(format!("FULLNAME_PORT={raw:?} is not a valid port: {e}"))
            })?,
            None => defaults.port,
        };

        let auth_token = lookup("FULLNAME_AUTH_TOKEN")
            .filter(|t| !t.is_empty())
            .map(SecretString::new);

        Ok(Self {
            host,
            port,
            auth_token,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub name_endpoint: Arc<TypedEndpoint<NameEndpoint>>,
}

impl AppState {
    /// State with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Endpoint`] if an endpoint schema fails to compile.
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(AppConfig::default())
    }

    /// Compile every endpoint once for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Endpoint`] if an endpoint schema fails to compile.
    pub fn with_config(config: AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            config,
            name_endpoint: Arc::new(TypedEndpoint::new(NameEndpoint)?),
        })
    }

    /// Definitions of every mounted endpoint, for documentation.
    pub fn endpoint_definitions(&self) -> Vec<EndpointDefinition> {
        vec![self.name_endpoint.definition().clone()]
    }
}
