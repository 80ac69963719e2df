//! # Shape Casting
//!
//! Projects a value onto a schema's declared fields. Undeclared keys are
//! dropped at every nesting level; missing required fields and fields of the
//! wrong primitive kind are errors. [`cast_into`] then constructs the
//! declared Rust type from the projection, so the type, not the computation
//! that produced the value, decides what reaches the wire.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::{FieldKind, ObjectSchema};

/// Failure to cast a value onto a schema.
#[derive(Error, Debug)]
pub enum CastError {
    /// The value at `path` is not a JSON object.
    #[error("expected an object at {path}")]
    NotAnObject { path: String },

    /// A required field is absent.
    #[error("missing required field {path}")]
    MissingField { path: String },

    /// A field is present with the wrong primitive kind.
    #[error("field {path} must be of type {expected}")]
    MismatchedKind { path: String, expected: &'static str },

    /// The projected value did not deserialize into the target type.
    #[error("cannot construct target type: {0}")]
    Construct(#[from] serde_json::Error),
}

/// Project `value` onto `schema`, keeping only declared fields.
///
/// # Errors
///
/// Returns a [`CastError`] when `value` is not an object, lacks a required
/// field, or carries a declared field of the wrong kind.
pub fn cast(schema: &ObjectSchema, value: &Value) -> Result<Value, CastError> {
    project(schema, value, "")
}

/// Project `value` onto `schema` and construct `T` from the result.
///
/// # Errors
///
/// Everything [`cast`] reports, plus [`CastError::Construct`] when the
/// projection does not fit `T`.
pub fn cast_into<T: DeserializeOwned>(schema: &ObjectSchema, value: &Value) -> Result<T, CastError> {
    let projected = cast(schema, value)?;
    Ok(serde_json::from_value(projected)?)
}

fn project(schema: &ObjectSchema, value: &Value, path: &str) -> Result<Value, CastError> {
    let source = value.as_object().ok_or_else(|| CastError::NotAnObject {
        path: display_path(path),
    })?;

    let mut out = Map::new();
    for (name, field) in schema.fields() {
        let field_path = format!("{path}/{name}");
        match source.get(name) {
            Some(present) => {
                if !field.kind().matches(present) {
                    return Err(CastError::MismatchedKind {
                        path: field_path,
                        expected: field.kind().type_name(),
                    });
                }
                let projected = match field.kind() {
                    FieldKind::Object(inner) => project(inner, present, &field_path)?,
                    FieldKind::Integer => integral(present),
                    _ => present.clone(),
                };
                out.insert(name.to_string(), projected);
            }
            None if field.is_required() => {
                return Err(CastError::MissingField { path: field_path });
            }
            None => {}
        }
    }
    Ok(Value::Object(out))
}

/// Rewrite an integer-valued float (`3.0`) as an integer so it constructs
/// integer Rust fields. Values outside the `i64`/`u64` range are kept.
fn integral(value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if value.is_f64() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Value::from(f as i64)
        }
        Some(f) if value.is_f64() && f >= 0.0 && f < u64::MAX as f64 => Value::from(f as u64),
        _ => value.clone(),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{define_object_schema, FieldSchema, ObjectOptions};
    use serde::Deserialize;
    use serde_json::json;

    fn full_name() -> ObjectSchema {
        define_object_schema([("fullName", FieldSchema::string())], ObjectOptions::closed())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct FullName {
        full_name: String,
    }

    #[test]
    fn test_drops_undeclared_fields() {
        let projected = cast(
            &full_name(),
            &json!({"fullName": "Ada Lovelace", "badField": "str"}),
        )
        .unwrap();
        assert_eq!(projected, json!({"fullName": "Ada Lovelace"}));
    }

    #[test]
    fn test_cast_into_builds_declared_type() {
        let typed: FullName = cast_into(
            &full_name(),
            &json!({"fullName": "Ada Lovelace", "internal": {"trace": 1}}),
        )
        .unwrap();
        assert_eq!(
            typed,
            FullName {
                full_name: "Ada Lovelace".into()
            }
        );
    }

    #[test]
    fn test_missing_required_field_fails() {
        let err = cast(&full_name(), &json!({})).unwrap_err();
        assert!(matches!(err, CastError::MissingField { ref path } if path == "/fullName"));
    }

    #[test]
    fn test_wrong_kind_fails() {
        let err = cast(&full_name(), &json!({"fullName": 42})).unwrap_err();
        assert!(matches!(
            err,
            CastError::MismatchedKind { expected: "string", .. }
        ));
    }

    #[test]
    fn test_non_object_fails() {
        let err = cast(&full_name(), &json!("Ada")).unwrap_err();
        assert_eq!(err.to_string(), "expected an object at (root)");
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let schema = define_object_schema(
            [
                ("a", FieldSchema::string()),
                ("b", FieldSchema::boolean().optional()),
            ],
            ObjectOptions::closed(),
        );
        assert_eq!(cast(&schema, &json!({"a": "x"})).unwrap(), json!({"a": "x"}));
        assert_eq!(
            cast(&schema, &json!({"a": "x", "b": true})).unwrap(),
            json!({"a": "x", "b": true})
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Counter {
        count: i64,
    }

    #[test]
    fn test_integer_valued_float_casts_to_integer() {
        let schema = define_object_schema([("count", FieldSchema::integer())], ObjectOptions::closed());
        let validator = crate::compile("counter", &schema).unwrap();
        let value = json!({"count": 3.0});
        assert!(validator.is_valid(&value));

        let projected = cast(&schema, &value).unwrap();
        assert_eq!(projected, json!({"count": 3}));
        assert!(projected["count"].is_i64());

        let typed: Counter = cast_into(&schema, &value).unwrap();
        assert_eq!(typed, Counter { count: 3 });
    }

    #[test]
    fn test_fractional_number_is_not_an_integer() {
        let schema = define_object_schema([("count", FieldSchema::integer())], ObjectOptions::closed());
        let err = cast(&schema, &json!({"count": 3.5})).unwrap_err();
        assert!(matches!(
            err,
            CastError::MismatchedKind { expected: "integer", ref path } if path == "/count"
        ));
    }

    #[test]
    fn test_nested_objects_are_projected() {
        let inner = define_object_schema([("city", FieldSchema::string())], ObjectOptions::closed());
        let schema = define_object_schema(
            [("address", FieldSchema::object(inner))],
            ObjectOptions::closed(),
        );
        let projected = cast(
            &schema,
            &json!({"address": {"city": "London", "secret": true}, "other": 1}),
        )
        .unwrap();
        assert_eq!(projected, json!({"address": {"city": "London"}}));

        let err = cast(&schema, &json!({"address": {}})).unwrap_err();
        assert!(matches!(err, CastError::MissingField { ref path } if path == "/address/city"));
    }
}
