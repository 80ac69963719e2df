//! # fullname CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fullname_cli::check::{run_check, CheckArgs};
use fullname_cli::openapi::{run_openapi, OpenapiArgs};
use fullname_cli::serve::{run_serve, ServeArgs};

/// fullname stack CLI
///
/// Exports the OpenAPI document, checks request bodies offline against the
/// `/api/name` schemas, and runs the API server.
#[derive(Parser, Debug)]
#[command(name = "fullname", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the OpenAPI document to a file.
    Openapi(OpenapiArgs),

    /// Check a JSON request body against the /api/name pipeline.
    Check(CheckArgs),

    /// Run the API server.
    Serve(ServeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // `serve` logs at info even without -v.
    let filter = match (cli.verbose, &cli.command) {
        (0, Commands::Serve(_)) => EnvFilter::new("info"),
        (0, _) => EnvFilter::new("warn"),
        (1, _) => EnvFilter::new("info"),
        (2, _) => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("fullname CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Commands::Openapi(args) => run_openapi(args),
        Commands::Check(args) => run_check(args),
        Commands::Serve(args) => run_serve(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
