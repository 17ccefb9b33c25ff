//! In-process request log, bounded to the most recent entries

use std::collections::VecDeque;

use application::{ApplicationError, LogSinkPort};
use async_trait::async_trait;
use domain::LogEntry;
use tokio::sync::RwLock;

/// Default number of entries kept
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Ring buffer of log entries; the oldest entry is evicted when full
#[derive(Debug)]
pub struct MemoryLogSink {
    entries: RwLock<VecDeque<LogEntry>>,
    capacity: usize,
}

impl Default for MemoryLogSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl LogSinkPort for MemoryLogSink {
    async fn append(&self, entry: &LogEntry) -> Result<(), ApplicationError> {
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<LogEntry>, ApplicationError> {
        Ok(self.entries.read().await.iter().cloned().collect())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use domain::LogLevel;

    use super::*;

    #[tokio::test]
    async fn keeps_append_order() {
        let sink = MemoryLogSink::new();
        sink.append(&LogEntry::new(LogLevel::Info, "a", "GET /"))
            .await
            .unwrap();
        sink.append(&LogEntry::new(LogLevel::Warn, "b", "GET /"))
            .await
            .unwrap();

        let entries = sink.entries().await.unwrap();
        assert_eq!(entries[0].message, "a");
        assert_eq!(entries[1].message, "b");
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let sink = MemoryLogSink::with_capacity(2);
        for msg in ["a", "b", "c"] {
            sink.append(&LogEntry::new(LogLevel::Info, msg, "GET /"))
                .await
                .unwrap();
        }

        let messages: Vec<String> = sink
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, ["b", "c"]);
        assert_eq!(sink.len().await, 2);
    }
}
