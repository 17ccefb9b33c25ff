//! Persistence module
//!
//! Embedded key-value storage for CMS sessions and the request log sinks.

pub mod error;
pub mod file_log_sink;
pub mod memory_log_sink;
pub mod redb_store;

pub use file_log_sink::FileLogSink;
pub use memory_log_sink::MemoryLogSink;
pub use redb_store::RedbKeyValueStore;
