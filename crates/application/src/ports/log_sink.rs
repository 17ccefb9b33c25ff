//! Port for the persistent request log

use async_trait::async_trait;
use domain::LogEntry;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Append-only store of request log entries
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogSinkPort: Send + Sync {
    /// Append one entry
    async fn append(&self, entry: &LogEntry) -> Result<(), ApplicationError>;

    /// All stored entries, oldest first
    async fn entries(&self) -> Result<Vec<LogEntry>, ApplicationError>;

    /// Check if the sink is writable
    async fn is_healthy(&self) -> bool;
}
