//! HTTP server configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (empty = allow all in dev, specific origins in production)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Graceful shutdown timeout in seconds
    #[serde(default)]
    pub shutdown_timeout_secs: Option<u64>,

    /// Per-request timeout in seconds; unset means requests run to completion
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Log format: "json" for structured JSON logs, "text" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Maximum body size for JSON requests in bytes (default: 1MB)
    #[serde(default = "default_max_body_json")]
    pub max_body_size_json_bytes: usize,

    /// Include internal error details in API responses
    ///
    /// Defaults to off; production deployments should leave it off.
    #[serde(default)]
    pub expose_internal_errors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_max_body_json() -> usize {
    1024 * 1024 // 1MB
}

const fn default_port() -> u16 {
    5000
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            allowed_origins: Vec::new(),
            shutdown_timeout_secs: Some(30),
            request_timeout_secs: None,
            log_format: default_log_format(),
            max_body_size_json_bytes: default_max_body_json(),
            expose_internal_errors: false,
        }
    }
}

impl ServerConfig {
    /// Address to bind, as `host:port`
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert!(config.cors_enabled);
        assert!(config.request_timeout_secs.is_none());
        assert!(!config.expose_internal_errors);
    }

    #[test]
    fn serde_defaults_match_default_impl() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, ServerConfig::default().port);
        assert_eq!(config.log_format, "text");
        assert_eq!(config.max_body_size_json_bytes, 1024 * 1024);
    }
}
