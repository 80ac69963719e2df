//! # Full Name Endpoint
//!
//! `POST /api/name` joins a first and last name.
//!
//! | Status | Body                          | When                                   |
//! |--------|-------------------------------|----------------------------------------|
//! | 200    | `{"fullName": "..."}`         | valid body                             |
//! | 400    | `{"title": "Invalid body"}`   | body fails the request schema          |
//! | 400    | `{"title": "Invalid response"}` | computed payload fails its own schema |
//! | 405    | empty                         | any method other than POST             |
//!
//! `surname` is accepted for compatibility, documented as deprecated, and
//! ignored.

use std::collections::BTreeMap;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use fullname_schema::{define_object_schema, FieldSchema, ObjectOptions, ObjectSchema};
use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, EndpointDefinition, ResponseSpec};
use crate::state::AppState;

pub const NAME_PATH: &str = "/api/name";

/// Mount the endpoint for every method; the pipeline answers non-POST
/// requests itself.
pub fn router() -> Router<AppState> {
    Router::new().route(NAME_PATH, any(full_name_handler))
}

async fn full_name_handler(State(state): State<AppState>, request: Request) -> Response {
    state.name_endpoint.serve(request).await
}

pub fn body_schema() -> ObjectSchema {
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

pub fn response_schema() -> ObjectSchema {
    define_object_schema([("fullName", FieldSchema::string())], ObjectOptions::closed())
}

pub fn error_schema() -> ObjectSchema {
    define_object_schema([("title", FieldSchema::string())], ObjectOptions::closed())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRequest {
    pub first_name: String,
    pub last_name: String,
    /// Deprecated; never read.
    #[serde(default)]
    pub surname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameResponse {
    pub full_name: String,
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NameEndpoint;

impl Endpoint for NameEndpoint {
    type Request = NameRequest;
    type Payload = NameResponse;
    type Response = NameResponse;

    fn definition(&self) -> EndpointDefinition {
        let mut responses = BTreeMap::new();
        responses.insert(200, ResponseSpec::json("Success", response_schema()));
        responses.insert(
            400,
            ResponseSpec::json("Invalid request or server validation error", error_schema()),
        );
        responses.insert(405, ResponseSpec::empty("Method not allowed"));

        EndpointDefinition {
            method: Method::POST,
            path: NAME_PATH.to_string(),
            operation_id: "fullName".to_string(),
            summary: "Returns the full name for a given first/last name".to_string(),
            request_body: body_schema(),
            success_status: StatusCode::OK,
            responses,
        }
    }

    fn compute(&self, request: NameRequest) -> NameResponse {
        NameResponse {
            full_name: full_name(&request.first_name, &request.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointRejection, TypedEndpoint};
    use crate::error::ErrorBody;
    use fullname_schema::compile;

    #[test]
    fn test_joins_with_single_space() {
        assert_eq!(full_name("Ada", "Lovelace"), "Ada Lovelace");
        assert_eq!(full_name("", ""), " ");
    }

    #[test]
    fn test_surname_is_ignored() {
        let endpoint = TypedEndpoint::new(NameEndpoint).unwrap();
        let (status, response) = endpoint
            .handle(
                &Method::POST,
                br#"{"firstName":"Ada","lastName":"Lovelace","surname":"Byron"}"#,
            )
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_missing_last_name_is_invalid_body() {
        let endpoint = TypedEndpoint::new(NameEndpoint).unwrap();
        let err = endpoint
            .handle(&Method::POST, br#"{"firstName":"Ada"}"#)
            .unwrap_err();
        assert!(matches!(err, EndpointRejection::InvalidRequestBody(_)));
    }

    #[test]
    fn test_non_string_surname_is_invalid_body() {
        let endpoint = TypedEndpoint::new(NameEndpoint).unwrap();
        let err = endpoint
            .handle(
                &Method::POST,
                br#"{"firstName":"Ada","lastName":"Lovelace","surname":1}"#,
            )
            .unwrap_err();
        assert!(matches!(err, EndpointRejection::InvalidRequestBody(_)));
    }

    #[test]
    fn test_definition_documents_all_statuses() {
        let definition = NameEndpoint.definition();
        let statuses: Vec<u16> = definition.responses.keys().copied().collect();
        assert_eq!(statuses, vec![200, 400, 405]);
        assert!(definition.responses[&405].schema.is_none());
        assert_eq!(definition.success_schema(), Some(&response_schema()));
    }

    #[test]
    fn test_error_body_conforms_to_error_schema() {
        let validator = compile("fullName.response.400", &error_schema()).unwrap();
        let body = serde_json::to_value(ErrorBody::new("Invalid body")).unwrap();
        validator.validate(&body).unwrap();
    }
}
