//! Application services - Use case implementations

mod auth_service;
mod health_service;
mod log_service;
mod project_service;
mod session_store;
mod user_service;

pub use auth_service::{AuthService, LOGIN_SUCCESS_MESSAGE, LoginRequest};
pub use health_service::{HealthReport, HealthService, ServiceHealth};
pub use log_service::{DEFAULT_PAGE_SIZE, LogPage, LogService, MAX_PAGE_SIZE};
pub use project_service::ProjectService;
pub use session_store::{SessionStore, StoredSession, USERS_COLLECTION};
pub use user_service::UserService;
