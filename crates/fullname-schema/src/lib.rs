//! # fullname-schema — Declarative Schemas, Validation & Casting
//!
//! Every request and response body in the fullname stack is described by a
//! single declarative schema language. One definition serves two consumers:
//! the runtime validator and the OpenAPI exporter.
//!
//! ## Schema Registry (`schema`)
//!
//! [`define_object_schema`] builds an [`ObjectSchema`] from named
//! [`FieldSchema`]s. Schemas are immutable data and render to JSON Schema via
//! [`ObjectSchema::to_json_schema`].
//!
//! ## Validation (`validate`, `strict`)
//!
//! [`compile`] turns a schema into a [`CompiledValidator`]. The schema
//! document is checked in strict mode first: unknown keywords, unknown
//! formats and contradictory keyword combinations abort compilation instead
//! of being ignored at request time. Semantic formats (email, uuid, ipv4, ...)
//! are asserted, not merely annotated.
//!
//! ## Casting (`cast`)
//!
//! [`cast`] projects a value onto a schema's declared fields and
//! [`cast_into`] finishes the projection by constructing the declared Rust
//! type, so the wire payload always matches the documented contract.
//!
//! ## Crate Policy
//!
//! - No internal dependencies; sits at the bottom of the workspace DAG.
//! - Compile once at startup. A [`CompiledValidator`] is `Send + Sync` and is
//!   meant to be shared behind an `Arc`, never rebuilt per request.

pub mod cast;
pub mod schema;
pub mod strict;
pub mod validate;

pub use cast::{cast, cast_into, CastError};
pub use schema::{
    define_object_schema, FieldKind, FieldSchema, Format, ObjectOptions, ObjectSchema,
};
pub use strict::check_strict;
pub use validate::{
    compile, compile_value, CompiledValidator, SchemaError, ValidationViolations, Violation,
};
