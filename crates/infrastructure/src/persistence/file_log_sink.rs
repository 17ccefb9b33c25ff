//! Append-only JSON-lines request log

use std::path::{Path, PathBuf};

use application::{ApplicationError, LogSinkPort};
use async_trait::async_trait;
use domain::LogEntry;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::{debug, instrument};

/// Writes one redacted [`LogEntry`] per line to a file
///
/// Appends are serialized by an async mutex so concurrent requests never
/// interleave partial lines.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &str, e: &std::io::Error) -> ApplicationError {
        ApplicationError::Internal(format!(
            "Failed to {action} request log {}: {e}",
            self.path.display()
        ))
    }
}

#[async_trait]
impl LogSinkPort for FileLogSink {
    #[instrument(skip(self, entry), level = "trace")]
    async fn append(&self, entry: &LogEntry) -> Result<(), ApplicationError> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| ApplicationError::Internal(format!("Log entry serialize error: {e}")))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("create directory for", &e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error("open", &e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error("write", &e))?;
        file.flush().await.map_err(|e| self.io_error("flush", &e))
    }

    async fn entries(&self) -> Result<Vec<LogEntry>, ApplicationError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error("read", &e)),
        };

        let mut skipped = 0usize;
        let entries: Vec<LogEntry> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                serde_json::from_str(line)
                    .inspect_err(|_| skipped += 1)
                    .ok()
            })
            .collect();

        if skipped > 0 {
            debug!(skipped, path = %self.path.display(), "Skipped unreadable log lines");
        }
        Ok(entries)
    }

    async fn is_healthy(&self) -> bool {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::metadata(parent).await.is_ok_and(|m| m.is_dir()),
            None => true,
        }
    }
}
