//! # API Route Modules
//!
//! - `name`: `POST /api/name`, the full-name endpoint.

pub mod name;
