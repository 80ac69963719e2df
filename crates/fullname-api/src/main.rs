//! # fullname-api server entry point
//!
//! Reads configuration from the environment and serves the API.

use fullname_api::telemetry::{init_tracing, LogFormat};
use fullname_api::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info", LogFormat::from_env());

    let config = AppConfig::from_env()?;
    fullname_api::serve(config).await?;
    Ok(())
}
