//! Request log entry entity - One record per request/response pair

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::redaction::redact_value;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Level for a finished request: errors win, then client failures
    pub const fn for_status(status: u16, has_error: bool) -> Self {
        if has_error || status >= 500 {
            Self::Error
        } else if status >= 400 {
            Self::Warn
        } else {
            Self::Info
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured record of a single request
///
/// `meta` only ever holds redacted data: it can be set through
/// [`LogEntry::with_meta`] and is redacted again when read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Handler or route that produced the entry
    pub method_name: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "deserialize_redacted")]
    meta: Value,
}

fn deserialize_redacted<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let mut value = Value::deserialize(deserializer)?;
    redact_value(&mut value);
    Ok(value)
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            method_name: method_name.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            user: None,
            error: None,
            meta: Value::Null,
        }
    }

    /// Override the timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Set the user the request was made on behalf of
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the error description
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach request metadata, redacting sensitive fields
    #[must_use]
    pub fn with_meta(mut self, mut meta: Value) -> Self {
        redact_value(&mut meta);
        self.meta = meta;
        self
    }

    pub const fn meta(&self) -> &Value {
        &self.meta
    }

    /// See [`matches_search_text`]
    pub fn matches(&self, text: &str) -> bool {
        matches_search_text(self, text)
    }
}

/// Check whether an entry matches a free-text search
///
/// Matching is a case-insensitive substring test against the level, message,
/// method name and timestamp. An empty query, or the literal `"null"` that
/// clients send for an unset search box, matches everything.
pub fn matches_search_text(entry: &LogEntry, text: &str) -> bool {
    let needle = text.trim();
    if needle.is_empty() || needle == "null" {
        return true;
    }
    let needle = needle.to_lowercase();

    [
        entry.level.as_str(),
        entry.message.as_str(),
        entry.method_name.as_str(),
        entry.timestamp.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::redaction::REDACTED;

    fn entry() -> LogEntry {
        LogEntry::new(LogLevel::Info, "Hello World", "x").with_timestamp("t")
    }

    #[test]
    fn empty_search_matches_everything() {
        assert!(matches_search_text(&entry(), ""));
    }

    #[test]
    fn null_search_matches_everything() {
        assert!(matches_search_text(&entry(), "null"));
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(matches_search_text(&entry(), "hello"));
        assert!(matches_search_text(&entry(), "WORLD"));
    }

    #[test]
    fn search_covers_level_method_and_timestamp() {
        let entry = LogEntry::new(LogLevel::Warn, "m", "userSession")
            .with_timestamp("2026-03-01T10:00:00.000Z");
        assert!(entry.matches("WARN"));
        assert!(entry.matches("session"));
        assert!(entry.matches("2026-03"));
        assert!(!entry.matches("profile"));
    }

    #[test]
    fn search_does_not_look_inside_meta() {
        let entry = entry().with_meta(json!({"path": "/secret-route"}));
        assert!(!entry.matches("secret-route"));
    }

    #[test]
    fn level_for_status() {
        assert_eq!(LogLevel::for_status(200, false), LogLevel::Info);
        assert_eq!(LogLevel::for_status(302, false), LogLevel::Info);
        assert_eq!(LogLevel::for_status(404, false), LogLevel::Warn);
        assert_eq!(LogLevel::for_status(503, false), LogLevel::Error);
        assert_eq!(LogLevel::for_status(200, true), LogLevel::Error);
    }

    #[test]
    fn meta_is_redacted_on_set() {
        let entry = entry().with_meta(json!({"headers": {"app_token": "eyJ"}}));
        assert_eq!(entry.meta()["headers"]["app_token"], REDACTED);
    }

    #[test]
    fn meta_is_redacted_on_load() {
        let raw = json!({
            "level": "info",
            "message": "m",
            "methodName": "x",
            "timestamp": "t",
            "meta": {"authorization": "Bearer abc"}
        });
        let entry: LogEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(entry.meta()["authorization"], REDACTED);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(entry().with_user("blt1")).unwrap();
        assert_eq!(value["methodName"], "x");
        assert_eq!(value["level"], "info");
        assert_eq!(value["user"], "blt1");
        assert!(value.get("error").is_none());
    }
}
