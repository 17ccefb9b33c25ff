//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `auth`: app token signing
//! - `regions`: per-region CMS endpoints
//! - `storage`: session store and request log locations
//! - `integrations`: migration service and outbound HTTP settings
//!
//! Sources are layered: built-in defaults, then an optional `config.toml`,
//! then `MIGRATION_`-prefixed environment variables with `__` between
//! nested keys (e.g. `MIGRATION_SERVER__PORT=8080`).

mod auth;
mod integrations;
mod regions;
mod server;
mod storage;

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

pub use auth::AuthConfig;
pub use integrations::{MigrationConfig, UpstreamConfig};
pub use regions::{RegionEndpoints, RegionsConfig};
pub use server::ServerConfig;
pub use storage::{LoggingConfig, StorageConfig};

/// Prefix of environment variables read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "MIGRATION";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Controls security validation strictness and whether internal error
/// details reach API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - relaxed security warnings
    #[default]
    Development,
    /// Production environment - strict security validation
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Option<Environment>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// CMS endpoints per region
    #[serde(default)]
    pub regions: RegionsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub migration: MigrationConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load configuration from an explicit file, then the environment
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Whether the environment is explicitly production
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Some(Environment::Production)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn environment_default_is_development() {
        assert_eq!(Environment::default(), Environment::Development);
    }

    #[test]
    fn environment_display() {
        assert_eq!(format!("{}", Environment::Development), "development");
        assert_eq!(format!("{}", Environment::Production), "production");
    }

    #[test]
    fn environment_from_str() {
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "DEVELOPMENT".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert!(!config.is_production());
        assert!(config.auth.signing_key.is_none());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn app_config_deserializes_partial_document() {
        let config: AppConfig = from_json(
            r#"{"environment": "production", "server": {"port": 8080}, "auth": {"signing_key": "k"}}"#,
        );
        assert!(config.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.auth.signing_key.is_some());
        assert_eq!(
            config.regions.na.api_url,
            RegionsConfig::default().na.api_url
        );
    }

    #[test]
    fn signing_key_is_never_serialized() {
        let config: AppConfig = from_json(r#"{"auth": {"signing_key": "top-secret"}}"#);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("top-secret"));
        assert!(!format!("{config:?}").contains("top-secret"));
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 6100\n\n[migration]\nbase_url = \"http://migrate.local\""
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 6100);
        assert_eq!(config.migration.base_url, "http://migrate.local");
    }

    #[test]
    fn load_from_missing_file_fails() {
        assert!(AppConfig::load_from(Path::new("/nonexistent/gateway.toml")).is_err());
    }

    fn from_json(json: &str) -> AppConfig {
        serde_json::from_str(json).unwrap()
    }
}
