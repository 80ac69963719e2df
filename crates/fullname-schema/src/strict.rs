//! # Strict Mode
//!
//! Static checks run on a schema document before it is compiled. The
//! `jsonschema` crate silently ignores keywords it does not know, so a typo
//! such as `"additionalProperty": false` would compile into a validator that
//! accepts extra keys. Strict mode turns that class of mistake into a
//! startup failure.
//!
//! Rejected:
//!
//! - keywords outside the Draft 2020-12 vocabulary
//! - `format` values the validator cannot assert
//! - `format` on a schema whose declared `type` is not `string`
//! - object keywords on a schema whose declared `type` is not `object`
//! - `required` entries missing from a sibling `properties`
//! - a non-boolean `deprecated`, or an `additionalProperties` that is
//!   neither a boolean nor a schema

use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::Format;

/// Every keyword a schema document may carry.
const KNOWN_KEYWORDS: &[&str] = &[
    // core
    "$schema", "$id", "$ref", "$anchor", "$dynamicRef", "$dynamicAnchor", "$vocabulary",
    "$comment", "$defs", "definitions",
    // applicators
    "allOf", "anyOf", "oneOf", "not", "if", "then", "else", "dependentSchemas",
    "prefixItems", "items", "contains", "properties", "patternProperties",
    "additionalProperties", "propertyNames", "unevaluatedItems", "unevaluatedProperties",
    // validation
    "type", "enum", "const", "multipleOf", "maximum", "exclusiveMaximum", "minimum",
    "exclusiveMinimum", "maxLength", "minLength", "pattern", "maxItems", "minItems",
    "uniqueItems", "maxContains", "minContains", "maxProperties", "minProperties",
    "required", "dependentRequired",
    // format, content, meta-data
    "format", "contentEncoding", "contentMediaType", "contentSchema", "title",
    "description", "default", "deprecated", "readOnly", "writeOnly", "examples",
];

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
    "propertyNames",
    "minProperties",
    "maxProperties",
];

/// Keywords whose value is a single subschema.
const SUBSCHEMA_KEYWORDS: &[&str] = &[
    "not",
    "if",
    "then",
    "else",
    "items",
    "contains",
    "propertyNames",
    "unevaluatedItems",
    "unevaluatedProperties",
    "contentSchema",
];

/// Keywords whose value is an array of subschemas.
const SUBSCHEMA_ARRAY_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// Keywords whose value maps names to subschemas.
const SUBSCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// A strict-mode rejection, located by JSON Pointer into the schema document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {reason}")]
pub struct StrictViolation {
    /// JSON Pointer to the offending subschema (`(root)` for the root).
    pub path: String,
    /// What is wrong with it.
    pub reason: String,
}

/// Run every strict-mode check over `schema`, stopping at the first problem.
pub fn check_strict(schema: &Value) -> Result<(), StrictViolation> {
    check_node(schema, "")
}

fn violation(path: &str, reason: impl Into<String>) -> StrictViolation {
    StrictViolation {
        path: if path.is_empty() { "(root)".into() } else { path.into() },
        reason: reason.into(),
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn check_node(node: &Value, path: &str) -> Result<(), StrictViolation> {
    let map = match node {
        // Boolean schemas are valid anywhere a schema is.
        Value::Bool(_) => return Ok(()),
        Value::Object(map) => map,
        _ => return Err(violation(path, "schema must be an object or a boolean")),
    };

    for keyword in map.keys() {
        if !KNOWN_KEYWORDS.contains(&keyword.as_str()) {
            return Err(violation(path, format!("unknown keyword \"{keyword}\"")));
        }
    }

    let declared_types = declared_types(map);
    check_format(map, path, declared_types.as_deref())?;
    check_object_keywords(map, path, declared_types.as_deref())?;

    if let Some(deprecated) = map.get("deprecated") {
        if !deprecated.is_boolean() {
            return Err(violation(path, "\"deprecated\" must be a boolean"));
        }
    }

    for keyword in SUBSCHEMA_KEYWORDS {
        if let Some(sub) = map.get(*keyword) {
            check_node(sub, &format!("{path}/{keyword}"))?;
        }
    }
    for keyword in SUBSCHEMA_ARRAY_KEYWORDS {
        if let Some(sub) = map.get(*keyword) {
            let items = sub
                .as_array()
                .ok_or_else(|| violation(path, format!("\"{keyword}\" must be an array")))?;
            for (i, item) in items.iter().enumerate() {
                check_node(item, &format!("{path}/{keyword}/{i}"))?;
            }
        }
    }
    for keyword in SUBSCHEMA_MAP_KEYWORDS {
        if let Some(sub) = map.get(*keyword) {
            let entries = sub
                .as_object()
                .ok_or_else(|| violation(path, format!("\"{keyword}\" must be an object")))?;
            for (name, item) in entries {
                check_node(item, &format!("{path}/{keyword}/{}", escape(name)))?;
            }
        }
    }
    Ok(())
}

/// The `type` keyword as a list, or `None` when absent.
fn declared_types(map: &Map<String, Value>) -> Option<Vec<&str>> {
    match map.get("type")? {
        Value::String(single) => Some(vec![single.as_str()]),
        Value::Array(many) => Some(many.iter().filter_map(Value::as_str).collect()),
        _ => Some(Vec::new()),
    }
}

fn check_format(
    map: &Map<String, Value>,
    path: &str,
    types: Option<&[&str]>,
) -> Result<(), StrictViolation> {
    let Some(format) = map.get("format") else {
        return Ok(());
    };
    let keyword = format
        .as_str()
        .ok_or_else(|| violation(path, "\"format\" must be a string"))?;
    if Format::from_keyword(keyword).is_none() {
        return Err(violation(path, format!("unknown format \"{keyword}\"")));
    }
    if let Some(types) = types {
        if !types.contains(&"string") {
            return Err(violation(
                path,
                format!("format \"{keyword}\" applies only to type \"string\""),
            ));
        }
    }
    Ok(())
}

fn check_object_keywords(
    map: &Map<String, Value>,
    path: &str,
    types: Option<&[&str]>,
) -> Result<(), StrictViolation> {
    if let Some(types) = types {
        if !types.contains(&"object") {
            if let Some(keyword) = OBJECT_KEYWORDS.iter().find(|k| map.contains_key(**k)) {
                return Err(violation(
                    path,
                    format!("\"{keyword}\" requires type \"object\""),
                ));
            }
        }
    }

    if let Some(additional) = map.get("additionalProperties") {
        if additional.is_object() {
            check_node(additional, &format!("{path}/additionalProperties"))?;
        } else if !additional.is_boolean() {
            return Err(violation(
                path,
                "\"additionalProperties\" must be a boolean or a schema",
            ));
        }
    }

    if let Some(required) = map.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| violation(path, "\"required\" must be an array"))?;
        if let Some(properties) = map.get("properties").and_then(Value::as_object) {
            for name in required {
                let name = name
                    .as_str()
                    .ok_or_else(|| violation(path, "\"required\" entries must be strings"))?;
                if !properties.contains_key(name) {
                    return Err(violation(
                        path,
                        format!("required property \"{name}\" is not declared in \"properties\""),
                    ));
                }
            }
        }
    }
    Ok(())
}
