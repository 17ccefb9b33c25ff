//! HTTP middleware components
//!
//! Request correlation, request logging, app token authentication and
//! declarative request validation.

pub mod auth;
pub mod request_id;
pub mod request_log;
pub mod validation;

pub use auth::{APP_TOKEN_HEADER, AppTokenAuth, AppTokenAuthLayer, AuthenticatedUser};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdService};
pub use request_log::{RequestLog, RequestLogLayer};
pub use validation::{RequestSchema, Validated, ValidatedPath};
