//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod contentstack_identity_adapter;
mod http_migration_adapter;
mod jwt_token_service;
mod upstream_response;

pub use contentstack_identity_adapter::ContentstackIdentityProvider;
pub use http_migration_adapter::HttpMigrationService;
pub use jwt_token_service::JwtTokenService;
