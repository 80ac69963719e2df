//! # Serve Subcommand
//!
//! Starts the API server. Flags override `FULLNAME_*` environment values.

use anyhow::{Context, Result};
use clap::Args;

use fullname_api::auth::SecretString;
use fullname_api::AppConfig;

/// Arguments for the serve subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides FULLNAME_HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides FULLNAME_PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Bearer token required on /api/* (overrides FULLNAME_AUTH_TOKEN).
    #[arg(long, env = "FULLNAME_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
}

/// Merge flags over an environment-derived config.
pub fn resolve_config(args: &ServeArgs, mut config: AppConfig) -> AppConfig {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(token) = args.auth_token.as_deref().filter(|t| !t.is_empty()) {
        config.auth_token = Some(SecretString::new(token));
    }
    config
}

/// Execute the serve subcommand; blocks until shutdown.
pub fn run_serve(args: &ServeArgs) -> Result<u8> {
    let config = resolve_config(args, AppConfig::from_env()?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(fullname_api::serve(config))?;
    Ok(0)
}
