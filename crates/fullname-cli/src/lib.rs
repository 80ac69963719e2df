//! # fullname-cli — CLI Tool for the fullname stack
//!
//! Provides the `fullname` command-line interface.
//!
//! ## Subcommands
//!
//! - `fullname openapi`: Export the OpenAPI document as YAML or JSON.
//! - `fullname check`: Run a request body through the `/api/name` pipeline
//!   offline and report schema violations.
//! - `fullname serve`: Start the API server.
//!
//! ```bash
//! fullname openapi --out openapi.yaml
//! fullname openapi --out openapi.json --format json
//! fullname check body.json
//! fullname serve --port 8080
//! ```

pub mod check;
pub mod openapi;
pub mod serve;
