//! # Schema Validation
//!
//! Compiles schemas into reusable validators backed by the `jsonschema`
//! crate (Draft 2020-12, format assertions on).
//!
//! ## Trust Boundary
//!
//! A value that passes [`CompiledValidator::validate`] is trusted for the rest
//! of the request. A value that fails is reported as a structured list of
//! [`Violation`]s carrying the instance path, the schema path and a message.
//!
//! ## Compile Once
//!
//! Compilation runs the strict-mode checks in [`crate::strict`] and then
//! builds the `jsonschema` validator. Both are comparatively expensive and
//! both happen at startup; the resulting [`CompiledValidator`] is immutable
//! and `Send + Sync`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::schema::ObjectSchema;
use crate::strict::{check_strict, StrictViolation};

/// Failure to turn a schema into a validator.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document failed a strict-mode check.
    #[error("strict mode rejected schema '{schema_name}' at {violation}")]
    Strict {
        /// Name the schema was registered under.
        schema_name: String,
        /// The first strict-mode problem found.
        #[source]
        violation: StrictViolation,
    },

    /// The `jsonschema` crate refused to build a validator.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    Build {
        /// Name the schema was registered under.
        schema_name: String,
        /// Reason reported by the validator builder.
        reason: String,
    },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Every violation produced by one failed validation call.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationViolations {
    schema_name: String,
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Name of the schema the value was checked against.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed against schema '{}'", self.schema_name)?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationViolations {}

/// A compiled, reusable validator for one schema.
pub struct CompiledValidator {
    name: String,
    schema: Value,
    inner: jsonschema::Validator,
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Compile an [`ObjectSchema`] under `name`.
///
/// # Errors
///
/// Returns [`SchemaError::Strict`] or [`SchemaError::Build`] when the
/// rendered schema cannot be compiled.
pub fn compile(name: &str, schema: &ObjectSchema) -> Result<CompiledValidator, SchemaError> {
    compile_value(name, &schema.to_json_schema())
}

/// Compile a raw JSON Schema document under `name`.
///
/// Strict-mode checks run first; see [`crate::strict`].
///
/// # Errors
///
/// Returns [`SchemaError::Strict`] when the document fails strict mode and
/// [`SchemaError::Build`] when the validator cannot be built.
pub fn compile_value(name: &str, schema: &Value) -> Result<CompiledValidator, SchemaError> {
    check_strict(schema).map_err(|violation| SchemaError::Strict {
        schema_name: name.to_string(),
        violation,
    })?;

    let inner = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .should_validate_formats(true)
        .should_ignore_unknown_formats(false)
        .build(schema)
        .map_err(|e| SchemaError::Build {
            schema_name: name.to_string(),
            reason: e.to_string(),
        })?;

    tracing::debug!(schema = name, "compiled schema validator");

    Ok(CompiledValidator {
        name: name.to_string(),
        schema: schema.clone(),
        inner,
    })
}

impl CompiledValidator {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JSON Schema document this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Fast pass/fail check.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.inner.is_valid(instance)
    }

    /// Validate `instance`, collecting every violation on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationViolations`] listing each failed check.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationViolations> {
        let violations: Vec<Violation> = self
            .inner
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationViolations {
                schema_name: self.name.clone(),
                violations,
            })
        }
    }
}
