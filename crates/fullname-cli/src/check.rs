//! # Check Subcommand
//!
//! Runs a JSON request body through the `/api/name` pipeline without a
//! server. Prints the response on success and every schema violation on
//! failure.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::http::Method;
use clap::Args;

use fullname_api::endpoint::{BodyProblem, EndpointRejection, TypedEndpoint};
use fullname_api::routes::name::NameEndpoint;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON body to check; `-` reads stdin.
    pub path: PathBuf,
}

/// Outcome of checking one body.
#[derive(Debug, PartialEq, Eq)]
pub enum CheckReport {
    /// The body passed; holds the serialized response.
    Accepted(String),
    /// The body was rejected; one line per problem.
    Rejected(Vec<String>),
}

/// Execute the check subcommand. Exit code 0 when accepted, 1 when rejected.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let body = read_body(&args.path)?;
    match check_body(&body)? {
        CheckReport::Accepted(response) => {
            println!("OK {response}");
            Ok(0)
        }
        CheckReport::Rejected(problems) => {
            println!("FAIL {}", args.path.display());
            for problem in &problems {
                println!("  {problem}");
            }
            Ok(1)
        }
    }
}

/// Check `body` as a `POST /api/name` request.
pub fn check_body(body: &[u8]) -> Result<CheckReport> {
    let endpoint =
        TypedEndpoint::new(NameEndpoint).context("failed to compile endpoint schemas")?;

    match endpoint.handle(&Method::POST, body) {
        Ok((_, response)) => Ok(CheckReport::Accepted(
            serde_json::to_string(&response).context("failed to encode response")?,
        )),
        Err(EndpointRejection::InvalidRequestBody(BodyProblem::Schema(violations))) => {
            Ok(CheckReport::Rejected(
                violations.violations().iter().map(ToString::to_string).collect(),
            ))
        }
        Err(rejection) => Ok(CheckReport::Rejected(vec![rejection.to_string()])),
    }
}

fn read_body(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read body from stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read body: {}", path.display()))
}
