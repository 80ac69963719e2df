//! # Typed Endpoints
//!
//! Every endpoint runs the same pipeline:
//!
//! 1. **Method gate**: a request whose method differs from the declared one
//!    gets `405` with an empty body. Checked before the body is read.
//! 2. **Input validation**: the body is parsed as JSON and checked against
//!    the compiled request schema. Failure is `400 {"title":"Invalid body"}`.
//! 3. **Compute**: the validated body is deserialized into the endpoint's
//!    request type and handed to [`Endpoint::compute`].
//! 4. **Output validation**: the computed payload is checked against the
//!    compiled success schema. The success schemas are closed, so a payload
//!    carrying undeclared fields fails here with
//!    `400 {"title":"Invalid response"}` and is logged as a server defect.
//! 5. **Cast**: the validated payload is projected onto the success schema
//!    and constructed as [`Endpoint::Response`].
//! 6. **Serialize** with the declared success status.
//!
//! Every outcome is a [`Response`]; no failure escapes the handler.
//!
//! Validators are compiled once in [`TypedEndpoint::new`] and shared
//! read-only across requests.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use fullname_schema::{
    cast_into, compile, CastError, CompiledValidator, ObjectSchema, SchemaError,
    ValidationViolations,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::ErrorBody;

/// Upper bound on request body size read by the pipeline.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Title returned for request bodies that fail validation.
pub const INVALID_BODY: &str = "Invalid body";

/// Title returned when the computed payload fails its own schema.
pub const INVALID_RESPONSE: &str = "Invalid response";

/// One documented response of an endpoint.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub description: String,
    /// Body schema; `None` for responses without content.
    pub schema: Option<ObjectSchema>,
}

impl ResponseSpec {
    pub fn json(description: impl Into<String>, schema: ObjectSchema) -> Self {
        Self {
            description: description.into(),
            schema: Some(schema),
        }
    }

    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            schema: None,
        }
    }
}

/// Static description of an endpoint, shared by the runtime pipeline and
/// the OpenAPI exporter.
#[derive(Debug, Clone)]
pub struct EndpointDefinition {
    pub method: Method,
    pub path: String,
    pub operation_id: String,
    pub summary: String,
    pub request_body: ObjectSchema,
    pub success_status: StatusCode,
    /// Documented responses keyed by status code.
    pub responses: BTreeMap<u16, ResponseSpec>,
}

impl EndpointDefinition {
    /// Schema of the success response body.
    pub fn success_schema(&self) -> Option<&ObjectSchema> {
        self.responses
            .get(&self.success_status.as_u16())
            .and_then(|spec| spec.schema.as_ref())
    }
}

/// An endpoint's business logic plus its declared contract.
pub trait Endpoint: Send + Sync + 'static {
    /// Typed request body, built from a validated JSON value.
    type Request: DeserializeOwned;
    /// Whatever [`Endpoint::compute`] produces; validated before use.
    type Payload: Serialize;
    /// The documented success body, built by casting the payload.
    type Response: Serialize + DeserializeOwned;

    fn definition(&self) -> EndpointDefinition;

    fn compute(&self, request: Self::Request) -> Self::Payload;
}

/// Failure to prepare an endpoint at startup.
#[derive(Error, Debug)]
pub enum EndpointError {
    /// A request or response schema failed to compile.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The definition has no schema for its success status.
    #[error("endpoint '{operation_id}' declares no schema for success status {status}")]
    MissingSuccessSchema { operation_id: String, status: u16 },
}

/// Why a body was rejected.
#[derive(Error, Debug)]
pub enum BodyProblem {
    #[error("unreadable body: {0}")]
    Unreadable(String),

    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] ValidationViolations),

    #[error(transparent)]
    Cast(#[from] CastError),
}

/// A pipeline outcome other than success.
#[derive(Error, Debug)]
pub enum EndpointRejection {
    #[error("method {method} not allowed, expected {expected}")]
    MethodNotAllowed { method: Method, expected: Method },

    #[error("invalid request body: {0}")]
    InvalidRequestBody(BodyProblem),

    #[error("invalid response body: {0}")]
    InvalidResponseBody(BodyProblem),
}

impl EndpointRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidRequestBody(_) | Self::InvalidResponseBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for EndpointRejection {
    fn into_response(self) -> Response {
        match &self {
            Self::MethodNotAllowed { expected, .. } => {
                tracing::debug!(error = %self, "rejected request method");
                let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
                if let Ok(allow) = HeaderValue::from_str(expected.as_str()) {
                    response.headers_mut().insert(header::ALLOW, allow);
                }
                response
            }
            Self::InvalidRequestBody(_) => {
                tracing::warn!(error = %self, "rejected request body");
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new(INVALID_BODY))).into_response()
            }
            Self::InvalidResponseBody(_) => {
                // A server defect: the computation produced a payload outside
                // its own contract. Never forward it.
                tracing::error!(error = %self, "computed payload failed response schema");
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new(INVALID_RESPONSE))).into_response()
            }
        }
    }
}

/// An endpoint with its validators compiled.
#[derive(Debug)]
pub struct TypedEndpoint<E: Endpoint> {
    endpoint: E,
    definition: EndpointDefinition,
    success_schema: ObjectSchema,
    request_validator: CompiledValidator,
    response_validator: CompiledValidator,
}

impl<E: Endpoint> TypedEndpoint<E> {
    /// Compile the endpoint's request and success-response schemas.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when a schema fails to compile or no success
    /// schema is declared.
    pub fn new(endpoint: E) -> Result<Self, EndpointError> {
        let definition = endpoint.definition();
        let success_schema = definition.success_schema().cloned().ok_or_else(|| {
            EndpointError::MissingSuccessSchema {
                operation_id: definition.operation_id.clone(),
                status: definition.success_status.as_u16(),
            }
        })?;

        let request_validator = compile(
            &format!("{}.request", definition.operation_id),
            &definition.request_body,
        )?;
        let response_validator = compile(
            &format!(
                "{}.response.{}",
                definition.operation_id,
                definition.success_status.as_u16()
            ),
            &success_schema,
        )?;

        tracing::info!(
            method = %definition.method,
            path = %definition.path,
            operation = %definition.operation_id,
            "endpoint ready"
        );

        Ok(Self {
            endpoint,
            definition,
            success_schema,
            request_validator,
            response_validator,
        })
    }

    pub fn definition(&self) -> &EndpointDefinition {
        &self.definition
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Run the pipeline over an already-read body.
    ///
    /// # Errors
    ///
    /// Returns the [`EndpointRejection`] for whichever step failed first.
    pub fn handle(
        &self,
        method: &Method,
        body: &[u8],
    ) -> Result<(StatusCode, E::Response), EndpointRejection> {
        self.check_method(method)?;

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| EndpointRejection::InvalidRequestBody(e.into()))?;
        self.request_validator
            .validate(&value)
            .map_err(|e| EndpointRejection::InvalidRequestBody(e.into()))?;
        let request: E::Request = serde_json::from_value(value)
            .map_err(|e| EndpointRejection::InvalidRequestBody(e.into()))?;

        let payload = serde_json::to_value(self.endpoint.compute(request))
            .map_err(|e| EndpointRejection::InvalidResponseBody(e.into()))?;
        self.response_validator
            .validate(&payload)
            .map_err(|e| EndpointRejection::InvalidResponseBody(e.into()))?;

        let response: E::Response = cast_into(&self.success_schema, &payload)
            .map_err(|e| EndpointRejection::InvalidResponseBody(e.into()))?;

        Ok((self.definition.success_status, response))
    }

    /// Run the pipeline over an HTTP request. The method is checked before
    /// the body is read.
    pub async fn serve(&self, request: Request) -> Response {
        if let Err(rejection) = self.check_method(request.method()) {
            return rejection.into_response();
        }
        let method = request.method().clone();
        let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return EndpointRejection::InvalidRequestBody(BodyProblem::Unreadable(
                    e.to_string(),
                ))
                .into_response()
            }
        };
        self.respond(&method, &body)
    }

    /// [`TypedEndpoint::handle`] rendered as an HTTP response.
    pub fn respond(&self, method: &Method, body: &[u8]) -> Response {
        match self.handle(method, body) {
            Ok((status, response)) => (status, Json(response)).into_response(),
            Err(rejection) => rejection.into_response(),
        }
    }

    fn check_method(&self, method: &Method) -> Result<(), EndpointRejection> {
        if *method == self.definition.method {
            Ok(())
        } else {
            Err(EndpointRejection::MethodNotAllowed {
                method: method.clone(),
                expected: self.definition.method.clone(),
            })
        }
    }
}

/// Build a request for [`TypedEndpoint::serve`] in tests and tools.
pub fn json_request(method: Method, uri: &str, body: impl Into<Body>) -> Request {
    let mut request = Request::new(body.into());
    *request.method_mut() = method;
    if let Ok(uri) = uri.parse() {
        *request.uri_mut() = uri;
    }
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    request
}
