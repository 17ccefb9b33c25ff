//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: signed app tokens,
//! the CMS identity API, the migration service, redb session storage and
//! the request log sinks.

pub mod adapters;
pub mod config;
pub mod http;
pub mod persistence;
pub mod telemetry;
pub mod validation;

pub use adapters::*;
pub use config::{AppConfig, Environment, RegionsConfig, ServerConfig};
pub use http::{CorrelatedClientConfig, CorrelatedHttpClient, RequestIdProvider, X_REQUEST_ID};
pub use persistence::{FileLogSink, MemoryLogSink, RedbKeyValueStore};
pub use telemetry::{LogFormat, init_tracing};
pub use validation::{SecurityValidator, SecurityWarning, WarningSeverity};
