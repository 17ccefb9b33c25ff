//! Request validation
//!
//! Routes declare their rules as a [`ValidationSchema`]; the extractors here
//! gather body, query and path parameters, run the schema and only then hand
//! the typed request to the handler. The first failing rule rejects the
//! request with `400 validation_error`.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{Uri, request::Parts},
};
use domain::{RequestFields, ValidationSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request type with a static rule table
///
/// Implementations usually keep the schema in a `LazyLock`.
pub trait RequestSchema {
    fn schema() -> &'static ValidationSchema;
}

/// Validated JSON body (with query and path parameters available to rules)
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated<T>(pub T);

impl<T, S> FromRequest<S> for Validated<T>
where
    T: DeserializeOwned + RequestSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let params = path_params(&mut parts, state).await;
        let query = query_params(&parts.uri)?;

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let body = parse_body(&bytes)?;

        let fields = RequestFields {
            body,
            query,
            params,
        };
        T::schema().validate(&fields)?;

        serde_json::from_value(fields.body)
            .map(Self)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Validated path parameters (query parameters are visible to rules too)
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + RequestSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = path_params(parts, state).await;
        let query = query_params(&parts.uri)?;

        let fields = RequestFields {
            body: Value::Null,
            query,
            params,
        };
        T::schema().validate(&fields)?;

        serde_json::from_value(Value::Object(fields.params))
            .map(Self)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Parse a request body leniently: empty is `null`, anything else must be JSON
pub fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}

async fn path_params<S: Send + Sync>(parts: &mut Parts, state: &S) -> Map<String, Value> {
    // Routes without parameters reject `Path`; treat that as no parameters
    Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map(|Path(params)| strings_to_map(params))
        .unwrap_or_default()
}

fn query_params(uri: &Uri) -> Result<Map<String, Value>, ApiError> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| strings_to_map(params))
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn strings_to_map(params: HashMap<String, String>) -> Map<String, Value> {
    params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}
