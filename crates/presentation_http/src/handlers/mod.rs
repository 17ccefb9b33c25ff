//! HTTP request handlers
//!
//! Handlers are thin: one service call, whose `(status, data)` is written
//! back verbatim. Failures propagate as [`ApiError`](crate::ApiError).

pub mod auth;
pub mod health;
pub mod logs;
pub mod projects;
pub mod user;

use application::ServiceResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Write an upstream answer back unchanged
pub(crate) fn relay(response: ServiceResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(response.data)).into_response()
}
