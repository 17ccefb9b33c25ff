//! Migration service and outbound HTTP configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Location of the external migration engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Base URL of the migration service API
    #[serde(default = "default_migration_url")]
    pub base_url: String,
}

fn default_migration_url() -> String {
    "http://localhost:5001".to_string()
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            base_url: default_migration_url(),
        }
    }
}

/// Outbound HTTP client settings shared by all upstream adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Override for the User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

const fn default_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn migration_default_url() {
        assert_eq!(MigrationConfig::default().base_url, "http://localhost:5001");
    }
}
