//! # OpenAPI Export Subcommand
//!
//! Writes the document served at `/openapi.json` to disk. Every endpoint
//! schema is compiled first, so an export cannot describe a schema the
//! server would refuse to start with.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use fullname_api::openapi::{api_doc, to_yaml};
use fullname_api::AppState;

/// Output encoding for the exported document.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocFormat {
    #[default]
    Yaml,
    Json,
}

/// Arguments for the openapi subcommand.
#[derive(Args, Debug)]
pub struct OpenapiArgs {
    /// Destination file.
    #[arg(long, default_value = "openapi.yaml")]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = DocFormat::Yaml)]
    pub format: DocFormat,
}

/// Execute the openapi subcommand.
pub fn run_openapi(args: &OpenapiArgs) -> Result<u8> {
    let rendered = render(args.format)?;
    write_doc(&args.out, &rendered)?;
    println!("wrote OpenAPI document to {}", args.out.display());
    Ok(0)
}

/// Render the document in `format`.
pub fn render(format: DocFormat) -> Result<String> {
    let state = AppState::new().context("failed to compile endpoint schemas")?;
    let doc = api_doc(&state.endpoint_definitions());
    let rendered = match format {
        DocFormat::Yaml => to_yaml(&doc).context("failed to encode OpenAPI document as YAML")?,
        DocFormat::Json => {
            let mut json = serde_json::to_string_pretty(&doc)
                .context("failed to encode OpenAPI document as JSON")?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

fn write_doc(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write OpenAPI document: {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "OpenAPI document written");
    Ok(())
}
