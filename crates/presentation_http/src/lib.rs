//! Migration gateway HTTP presentation layer
//!
//! Request pipeline (request id, request log, panic recovery, app token
//! auth, validation) and the thin controllers behind it.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorDetail, ErrorResponse, set_expose_internal_errors};
pub use middleware::{
    AppTokenAuthLayer, RequestIdLayer, RequestLogLayer, RequestSchema, Validated, ValidatedPath,
};
pub use routes::{create_app, create_router, with_middleware};
pub use state::{AppState, Ports};
