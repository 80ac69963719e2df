//! # OpenAPI Specification Assembly
//!
//! Builds the OpenAPI document from [`EndpointDefinition`]s, rendering each
//! [`ObjectSchema`] into a utoipa schema. The same definitions drive the
//! runtime validators, so the document cannot drift from what the server
//! enforces.
//!
//! Served at `/openapi.json`; the `fullname openapi` CLI command writes it to
//! disk as YAML or JSON.

use axum::extract::State;
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use fullname_schema::{FieldKind, FieldSchema, ObjectSchema};
use utoipa::openapi::path::{OperationBuilder, PathItemType};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{AdditionalProperties, ObjectBuilder, Schema, SchemaFormat, SchemaType};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, Deprecated, InfoBuilder, OpenApi, OpenApiBuilder,
    PathItem, PathsBuilder, RefOr, Required, ResponseBuilder,
};

use crate::endpoint::EndpointDefinition;
use crate::state::AppState;

pub const API_TITLE: &str = "Fullname API";

/// Name of the declared bearer security scheme.
pub const BEARER_AUTH: &str = "BearerAuth";

const JSON_CONTENT: &str = "application/json";

/// Assemble the OpenAPI document for `definitions`.
pub fn api_doc(definitions: &[EndpointDefinition]) -> OpenApi {
    let mut paths = PathsBuilder::new();
    for definition in definitions {
        let Some(item_type) = path_item_type(&definition.method) else {
            tracing::warn!(
                method = %definition.method,
                path = %definition.path,
                "method has no OpenAPI path item; endpoint left undocumented"
            );
            continue;
        };
        paths = paths.path(
            definition.path.clone(),
            PathItem::new(item_type, operation(definition)),
        );
    }

    let components = ComponentsBuilder::new()
        .security_scheme(
            BEARER_AUTH,
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        )
        .build();

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(API_TITLE)
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .paths(paths.build())
        .components(Some(components))
        .security(Some(vec![SecurityRequirement::new(
            BEARER_AUTH,
            Vec::<String>::new(),
        )]))
        .build()
}

/// Render the document as YAML.
///
/// # Errors
///
/// Returns the serializer error if the document cannot be encoded.
pub fn to_yaml(doc: &OpenApi) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(doc)
}

/// Mount `GET /openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json(State(state): State<AppState>) -> Json<OpenApi> {
    Json(api_doc(&state.endpoint_definitions()))
}

fn operation(definition: &EndpointDefinition) -> utoipa::openapi::path::Operation {
    let request_body = RequestBodyBuilder::new()
        .content(
            JSON_CONTENT,
            ContentBuilder::new()
                .schema(object_schema(&definition.request_body))
                .build(),
        )
        .required(Some(Required::True))
        .build();

    let mut builder = OperationBuilder::new()
        .operation_id(Some(definition.operation_id.clone()))
        .summary(Some(definition.summary.clone()))
        .request_body(Some(request_body));

    for (status, spec) in &definition.responses {
        let mut response = ResponseBuilder::new().description(spec.description.clone());
        if let Some(schema) = &spec.schema {
            response = response.content(
                JSON_CONTENT,
                ContentBuilder::new().schema(object_schema(schema)).build(),
            );
        }
        builder = builder.response(status.to_string(), response.build());
    }
    builder.build()
}

fn path_item_type(method: &Method) -> Option<PathItemType> {
    let item_type = match *method {
        Method::GET => PathItemType::Get,
        Method::POST => PathItemType::Post,
        Method::PUT => PathItemType::Put,
        Method::DELETE => PathItemType::Delete,
        Method::PATCH => PathItemType::Patch,
        Method::HEAD => PathItemType::Head,
        Method::OPTIONS => PathItemType::Options,
        Method::TRACE => PathItemType::Trace,
        Method::CONNECT => PathItemType::Connect,
        _ => return None,
    };
    Some(item_type)
}

fn object_builder(schema: &ObjectSchema) -> ObjectBuilder {
    let mut builder = ObjectBuilder::new()
        .schema_type(SchemaType::Object)
        .description(schema.description().map(str::to_string))
        .additional_properties(Some(AdditionalProperties::<Schema>::FreeForm(
            schema.additional_properties(),
        )));
    for (name, field) in schema.fields() {
        builder = builder.property(name, field_schema(field));
        if field.is_required() {
            builder = builder.required(name);
        }
    }
    builder
}

fn object_schema(schema: &ObjectSchema) -> RefOr<Schema> {
    RefOr::T(Schema::Object(object_builder(schema).build()))
}

fn field_schema(field: &FieldSchema) -> RefOr<Schema> {
    let builder = match field.kind() {
        FieldKind::Object(inner) => object_builder(inner),
        FieldKind::String => ObjectBuilder::new().schema_type(SchemaType::String),
        FieldKind::Number => ObjectBuilder::new().schema_type(SchemaType::Number),
        FieldKind::Integer => ObjectBuilder::new().schema_type(SchemaType::Integer),
        FieldKind::Boolean => ObjectBuilder::new().schema_type(SchemaType::Boolean),
    };

    let mut builder = builder.format(
        field
            .format_kind()
            .map(|f| SchemaFormat::Custom(f.as_str().to_string())),
    );
    if let Some(description) = field.description_text() {
        builder = builder.description(Some(description.to_string()));
    }
    if field.is_deprecated() {
        builder = builder.deprecated(Some(Deprecated::True));
    }
    RefOr::T(Schema::Object(builder.build()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::name::NameEndpoint;
    use crate::endpoint::Endpoint;
    use fullname_schema::{define_object_schema, Format, ObjectOptions};
    use serde_json::{json, Value};

    fn name_doc() -> Value {
        serde_json::to_value(api_doc(&[NameEndpoint.definition()])).unwrap()
    }

    #[test]
    fn test_openapi_spec_has_info() {
        let doc = name_doc();
        assert_eq!(doc["info"]["title"], API_TITLE);
        assert!(doc["openapi"].as_str().unwrap().starts_with("3."));
    }

    #[test]
    fn test_openapi_spec_has_name_path() {
        let doc = name_doc();
        let post = &doc["paths"]["/api/name"]["post"];
        assert_eq!(
            post["summary"],
            "Returns the full name for a given first/last name"
        );
        assert!(doc["paths"]["/api/name"].get("get").is_none());
    }

    #[test]
    fn test_openapi_spec_request_body_schema() {
        let doc = name_doc();
        let schema =
            &doc["paths"]["/api/name"]["post"]["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["firstName", "lastName"]));
        assert_eq!(
            schema["properties"]["firstName"]["description"],
            "User's first name"
        );
        assert_eq!(schema["properties"]["surname"]["deprecated"], true);
    }

    #[test]
    fn test_openapi_spec_responses() {
        let doc = name_doc();
        let responses = &doc["paths"]["/api/name"]["post"]["responses"];
        assert_eq!(responses["200"]["description"], "Success");
        assert_eq!(
            responses["200"]["content"]["application/json"]["schema"]["properties"]["fullName"]
                ["type"],
            "string"
        );
        assert_eq!(
            responses["400"]["content"]["application/json"]["schema"]["required"],
            json!(["title"])
        );
        assert_eq!(responses["405"]["description"], "Method not allowed");
        assert!(responses["405"].get("content").is_none());
    }

    #[test]
    fn test_openapi_spec_has_security_scheme() {
        let doc = name_doc();
        let scheme = &doc["components"]["securitySchemes"][BEARER_AUTH];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "bearer");
        assert_eq!(doc["security"], json!([{ "BearerAuth": [] }]));
    }

    #[test]
    fn test_field_format_is_documented() {
        let schema = define_object_schema(
            [("contact", FieldSchema::string().format(Format::Email))],
            ObjectOptions::closed(),
        );
        let rendered = serde_json::to_value(object_schema(&schema)).unwrap();
        assert_eq!(rendered["properties"]["contact"]["format"], "email");
    }

    #[test]
    fn test_openapi_spec_serializes_to_yaml() {
        let yaml = to_yaml(&api_doc(&[NameEndpoint.definition()])).unwrap();
        assert!(yaml.contains("/api/name"));
        assert!(yaml.contains("BearerAuth"));
    }
}
