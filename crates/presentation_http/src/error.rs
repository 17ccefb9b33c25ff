//! API error handling
//!
//! Every handler failure ends up in [`ApiError::into_response`], the one place
//! errors are logged and turned into a JSON body. In production mode internal
//! errors return generic messages without details.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::ValidationFailure;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Global flag to control error detail exposure
/// Set to false in production to prevent information leakage
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

const GENERIC_MESSAGE: &str = "An error occurred processing your request";

/// Configure whether internal error details should be exposed in responses.
///
/// In production environments, this should be set to `false` so that
/// upstream addresses, file paths and panic messages stay server-side.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// Sanitize an error message to remove potentially sensitive information
fn sanitize_error_message(msg: &str) -> String {
    sanitize_with(msg, should_expose_details())
}

fn sanitize_with(msg: &str, expose: bool) -> String {
    if expose {
        return msg.to_string();
    }

    let sensitive_patterns = [
        // File paths
        "/home/",
        "/Users/",
        "/var/",
        "/etc/",
        "\\Users\\",
        "C:\\",
        // Stack trace indicators
        "stack backtrace",
        "panicked at",
        ".rs:",
        // Connection details
        "connection refused",
        "ECONNREFUSED",
        "timeout",
        "timed out",
    ];

    let msg_lower = msg.to_lowercase();
    if sensitive_patterns
        .iter()
        .any(|pattern| msg_lower.contains(&pattern.to_lowercase()))
    {
        return GENERIC_MESSAGE.to_string();
    }

    if msg.contains("://") || msg.contains('/') && msg.len() > 50 {
        return GENERIC_MESSAGE.to_string();
    }

    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed a validation rule; the message names the field
    #[error("{0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, code: &'static str },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Unauthorized with the generic code
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: "unauthorized",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized { code, .. } => *code,
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_error",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Attached to every error response so outer middleware can see what failed
/// without parsing the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            error!(code, error = %self, "Request failed");
        } else {
            warn!(code, error = %self, "Request rejected");
        }

        let (message, details) = match &self {
            Self::Validation(msg) => (msg.clone(), None),
            Self::BadRequest(msg) | Self::NotFound(msg) => (sanitize_error_message(msg), None),
            Self::Unauthorized { message, .. } => {
                // The code already tells the client what went wrong
                let sanitized = if should_expose_details() {
                    message.clone()
                } else {
                    "Authentication required".to_string()
                };
                (sanitized, None)
            },
            Self::Upstream(msg) => {
                let sanitized = if should_expose_details() {
                    msg.clone()
                } else {
                    "Upstream service unavailable".to_string()
                };
                (sanitized, None)
            },
            Self::Configuration(msg) | Self::Internal(msg) => {
                let details = should_expose_details().then(|| msg.clone());
                ("An internal error occurred".to_string(), details)
            },
        };

        let detail = ErrorDetail {
            code,
            message: self.to_string(),
        };
        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::Validation(msg) => Self::Validation(msg),
            ApplicationError::Token(e) if e.is_configuration() => {
                Self::Configuration(e.to_string())
            },
            ApplicationError::Token(e) => Self::Unauthorized {
                message: e.to_string(),
                code: e.code(),
            },
            ApplicationError::Unauthorized(msg) => Self::unauthorized(msg),
            ApplicationError::Upstream(msg) => Self::Upstream(msg),
            ApplicationError::Configuration(msg) => Self::Configuration(msg),
            ApplicationError::NotFound(msg) => Self::NotFound(msg),
            ApplicationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure.message)
    }
}
