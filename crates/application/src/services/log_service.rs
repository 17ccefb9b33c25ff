//! Recording and searching request logs

use std::{fmt, sync::Arc};

use domain::{LogEntry, matches_search_text};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{error::ApplicationError, ports::LogSinkPort};

/// Page size used when the caller gives none
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 500;

/// One page of search results, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogPage {
    /// Matches before paging
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
    pub entries: Vec<LogEntry>,
}

pub struct LogService {
    sink: Arc<dyn LogSinkPort>,
}

impl fmt::Debug for LogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogService").finish_non_exhaustive()
    }
}

impl LogService {
    pub fn new(sink: Arc<dyn LogSinkPort>) -> Self {
        Self { sink }
    }

    /// Persist an entry
    ///
    /// Sink failures are logged and swallowed; request handling never fails
    /// because the log could not be written.
    pub async fn record(&self, entry: &LogEntry) {
        if let Err(e) = self.sink.append(entry).await {
            warn!(error = %e, "Failed to persist request log entry");
        }
    }

    /// Search stored entries
    ///
    /// `text` follows [`matches_search_text`]; `None` matches everything.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        text: Option<&str>,
        skip: usize,
        limit: Option<usize>,
    ) -> Result<LogPage, ApplicationError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let text = text.unwrap_or_default();

        let matches: Vec<LogEntry> = self
            .sink
            .entries()
            .await?
            .into_iter()
            .rev()
            .filter(|entry| matches_search_text(entry, text))
            .collect();

        let total = matches.len();
        let entries = matches.into_iter().skip(skip).take(limit).collect();

        Ok(LogPage {
            total,
            skip,
            limit,
            entries,
        })
    }
}
