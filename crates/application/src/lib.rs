//! Application layer - Use cases and orchestration
//!
//! Contains the login, profile, project and log search use cases and the
//! port definitions they depend on. Adapters in the infrastructure layer
//! implement the ports.

pub mod error;
pub mod ports;
pub mod request_context;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use request_context::RequestContext;
pub use services::*;
