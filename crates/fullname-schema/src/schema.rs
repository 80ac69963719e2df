//! # Schema Registry
//!
//! Declarative description of request and response bodies. A schema is
//! plain data: building one has no side effects, and the same value feeds
//! both [`crate::validate::compile`] and the OpenAPI exporter.
//!
//! ## Example
//!
//! ```
//! use fullname_schema::{define_object_schema, FieldSchema, ObjectOptions};
//!
//! let body = define_object_schema(
//!     [
//!         ("firstName", FieldSchema::string().description("User's first name")),
//!         ("surname", FieldSchema::string().deprecated().optional()),
//!     ],
//!     ObjectOptions::closed(),
//! );
//! assert_eq!(body.required_fields(), vec!["firstName"]);
//! ```

use serde_json::{json, Map, Value};

/// Semantic string formats asserted by compiled validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    DateTime,
    Date,
    Time,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    UriTemplate,
    Uuid,
    JsonPointer,
    RelativeJsonPointer,
    Regex,
}

impl Format {
    /// Every supported format, in keyword order.
    pub const ALL: [Format; 14] = [
        Format::DateTime,
        Format::Date,
        Format::Time,
        Format::Email,
        Format::Hostname,
        Format::Ipv4,
        Format::Ipv6,
        Format::Uri,
        Format::UriReference,
        Format::UriTemplate,
        Format::Uuid,
        Format::JsonPointer,
        Format::RelativeJsonPointer,
        Format::Regex,
    ];

    /// The JSON Schema `format` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
            Self::Email => "email",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uri => "uri",
            Self::UriReference => "uri-reference",
            Self::UriTemplate => "uri-template",
            Self::Uuid => "uuid",
            Self::JsonPointer => "json-pointer",
            Self::RelativeJsonPointer => "relative-json-pointer",
            Self::Regex => "regex",
        }
    }

    /// Parse a `format` keyword value. Returns `None` for unsupported formats.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == keyword)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Object(ObjectSchema),
}

impl FieldKind {
    /// The JSON Schema `type` keyword value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object(_) => "object",
        }
    }

    /// Whether `value` has this primitive kind, using JSON Schema's notion of
    /// type: an integer is any number with a zero fractional part, so `3.0`
    /// is an integer. Nested objects are checked only for being objects;
    /// their fields are the caller's concern.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
            }
            Self::Boolean => value.is_boolean(),
            Self::Object(_) => value.is_object(),
        }
    }
}

/// Schema of a single named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    kind: FieldKind,
    description: Option<String>,
    deprecated: bool,
    format: Option<Format>,
    required: bool,
}

impl FieldSchema {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            description: None,
            deprecated: false,
            format: None,
            required: true,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::of(FieldKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Self::of(FieldKind::Object(schema))
    }

    /// Attach a human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as deprecated. Deprecated fields are still accepted.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Declare a semantic format. Only meaningful on string fields; any other
    /// kind is rejected when the schema is compiled.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Make the field optional (fields are required by default).
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn format_kind(&self) -> Option<Format> {
        self.format
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Render this field as a JSON Schema fragment.
    pub fn to_json_schema(&self) -> Value {
        let mut out = match &self.kind {
            FieldKind::Object(inner) => inner.to_json_schema(),
            other => json!({ "type": other.type_name() }),
        };
        if let Value::Object(map) = &mut out {
            if let Some(description) = &self.description {
                map.insert("description".into(), Value::String(description.clone()));
            }
            if self.deprecated {
                map.insert("deprecated".into(), Value::Bool(true));
            }
            if let Some(format) = self.format {
                map.insert("format".into(), Value::String(format.as_str().into()));
            }
        }
        out
    }
}

/// Options applied to an object schema as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectOptions {
    /// When `false`, any key not declared in the schema fails validation.
    pub additional_properties: bool,
}

impl ObjectOptions {
    /// Reject undeclared keys.
    pub fn closed() -> Self {
        Self {
            additional_properties: false,
        }
    }

    /// Accept undeclared keys (JSON Schema default).
    pub fn open() -> Self {
        Self {
            additional_properties: true,
        }
    }
}

impl Default for ObjectOptions {
    fn default() -> Self {
        Self::open()
    }
}

/// An object schema: named fields in declaration order plus an
/// additional-properties policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldSchema)>,
    additional_properties: bool,
    description: Option<String>,
}

/// Build an object schema from `(name, field)` pairs.
///
/// Declaring the same name twice keeps the first position and the last
/// definition.
pub fn define_object_schema<I, K>(fields: I, options: ObjectOptions) -> ObjectSchema
where
    I: IntoIterator<Item = (K, FieldSchema)>,
    K: Into<String>,
{
    let mut declared: Vec<(String, FieldSchema)> = Vec::new();
    for (name, field) in fields {
        let name = name.into();
        match declared.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = field,
            None => declared.push((name, field)),
        }
    }
    ObjectSchema {
        fields: declared,
        additional_properties: options.additional_properties,
        description: None,
    }
}

impl ObjectSchema {
    /// Attach a description to the object itself.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, field)| field)
    }

    /// Names of required fields, in declaration order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, field)| field.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn additional_properties(&self) -> bool {
        self.additional_properties
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Render as a JSON Schema object document.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for (name, field) in &self.fields {
            properties.insert(name.clone(), field.to_json_schema());
        }

        let mut out = Map::new();
        out.insert("type".into(), Value::String("object".into()));
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::String(description.clone()));
        }
        out.insert("properties".into(), Value::Object(properties));
        let required = self.required_fields();
        if !required.is_empty() {
            out.insert(
                "required".into(),
                Value::Array(required.into_iter().map(|n| Value::String(n.into())).collect()),
            );
        }
        out.insert(
            "additionalProperties".into(),
            Value::Bool(self.additional_properties),
        );
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_body() -> ObjectSchema {
        define_object_schema(
            [
                ("firstName", FieldSchema::string().description("User's first name")),
                ("lastName", FieldSchema::string().description("User's last name")),
                (
                    "surname",
                    FieldSchema::string()
                        .description("User's surname")
                        .deprecated()
                        .optional(),
                ),
            ],
            ObjectOptions::closed(),
        )
    }

    #[test]
    fn test_required_fields_skip_optional() {
        assert_eq!(name_body().required_fields(), vec!["firstName", "lastName"]);
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let binding = name_body();
        let names: Vec<&str> = binding.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["firstName", "lastName", "surname"]);
    }

    #[test]
    fn test_renders_json_schema() {
        let rendered = name_body().to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["additionalProperties"], false);
        assert_eq!(rendered["required"], json!(["firstName", "lastName"]));
        assert_eq!(rendered["properties"]["firstName"]["type"], "string");
        assert_eq!(
            rendered["properties"]["firstName"]["description"],
            "User's first name"
        );
        assert_eq!(rendered["properties"]["surname"]["deprecated"], true);
        assert!(rendered["properties"]["lastName"].get("deprecated").is_none());
    }

    #[test]
    fn test_all_optional_omits_required_keyword() {
        let schema = define_object_schema(
            [("note", FieldSchema::string().optional())],
            ObjectOptions::default(),
        );
        let rendered = schema.to_json_schema();
        assert!(rendered.get("required").is_none());
        assert_eq!(rendered["additionalProperties"], true);
    }

    #[test]
    fn test_nested_object_renders_inline() {
        let address = define_object_schema(
            [("city", FieldSchema::string())],
            ObjectOptions::closed(),
        );
        let schema = define_object_schema(
            [("address", FieldSchema::object(address).description("Postal address"))],
            ObjectOptions::closed(),
        );
        let rendered = schema.to_json_schema();
        let nested = &rendered["properties"]["address"];
        assert_eq!(nested["type"], "object");
        assert_eq!(nested["description"], "Postal address");
        assert_eq!(nested["properties"]["city"]["type"], "string");
        assert_eq!(nested["additionalProperties"], false);
    }

    #[test]
    fn test_format_is_rendered() {
        let schema = define_object_schema(
            [("contact", FieldSchema::string().format(Format::Email))],
            ObjectOptions::closed(),
        );
        assert_eq!(
            schema.to_json_schema()["properties"]["contact"]["format"],
            "email"
        );
    }

    #[test]
    fn test_duplicate_field_keeps_position_and_last_definition() {
        let schema = define_object_schema(
            [
                ("a", FieldSchema::string()),
                ("b", FieldSchema::boolean()),
                ("a", FieldSchema::number()),
            ],
            ObjectOptions::closed(),
        );
        let names: Vec<&str> = schema.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.field("a").map(|f| f.kind()), Some(&FieldKind::Number));
    }

    #[test]
    fn test_format_keyword_roundtrip() {
        for format in Format::ALL {
            assert_eq!(Format::from_keyword(format.as_str()), Some(format));
        }
        assert_eq!(Format::from_keyword("phone"), None);
    }

    #[test]
    fn test_kind_matches_values() {
        assert!(FieldKind::String.matches(&json!("x")));
        assert!(!FieldKind::String.matches(&json!(1)));
        assert!(FieldKind::Integer.matches(&json!(3)));
        assert!(FieldKind::Integer.matches(&json!(3.0)));
        assert!(FieldKind::Integer.matches(&json!(-2.0)));
        assert!(!FieldKind::Integer.matches(&json!(3.5)));
        assert!(!FieldKind::Integer.matches(&json!("3")));
        assert!(FieldKind::Number.matches(&json!(3.5)));
        assert!(FieldKind::Boolean.matches(&json!(false)));
    }
}
