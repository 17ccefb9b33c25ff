//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod identity_provider_port;
mod key_value_store;
mod log_sink;
mod migration_port;
mod service_response;
mod token_port;

#[cfg(test)]
pub use identity_provider_port::MockIdentityProviderPort;
pub use identity_provider_port::{Credentials, IdentityProviderPort};
#[cfg(test)]
pub use key_value_store::MockKeyValueStorePort;
pub use key_value_store::{KeyValueStoreExt, KeyValueStorePort};
#[cfg(test)]
pub use log_sink::MockLogSinkPort;
pub use log_sink::LogSinkPort;
#[cfg(test)]
pub use migration_port::MockMigrationPort;
pub use migration_port::{MigrationPort, UpstreamSession};
pub use service_response::ServiceResponse;
#[cfg(test)]
pub use token_port::MockTokenPort;
pub use token_port::{TokenError, TokenPort};
