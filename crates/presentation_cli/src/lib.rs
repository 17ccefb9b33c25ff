//! Migration gateway CLI
//!
//! Operator commands that work against the same configuration, signing key
//! and request log as the running server: minting and checking app tokens,
//! searching the request log and reporting local status.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use application::{HealthReport, HealthService, LogPage, LogService, TokenPort};
use clap::{Parser, Subcommand};
use domain::{Region, SessionClaims, TokenPayload, UserId};
use infrastructure::{
    AppConfig, FileLogSink, JwtTokenService, RedbKeyValueStore, SecurityValidator,
    SecurityWarning,
};
use serde::Serialize;
use serde_json::Value;

/// Environment variable the server reads its signing key from
pub const SIGNING_KEY_ENV: &str = "MIGRATION_AUTH__SIGNING_KEY";

/// Migration gateway CLI
#[derive(Debug, Parser)]
#[command(name = "migration-cli")]
#[command(author, version, about = "Migration gateway administration CLI", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to `config.toml` plus the environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign an app token
    ///
    /// Either session claims (`--region` with `--user-id`) or an arbitrary
    /// JSON object via `--payload`.
    ///
    /// Example: migration-cli issue-token --region EU --user-id blt5f5c0b3d
    IssueToken {
        /// Region of the session
        #[arg(long, requires = "user_id", conflicts_with = "payload")]
        region: Option<Region>,

        /// CMS user uid of the session
        #[arg(long, requires = "region", conflicts_with = "payload")]
        user_id: Option<String>,

        /// Raw JSON object to sign instead of session claims
        #[arg(long, required_unless_present = "region")]
        payload: Option<String>,

        /// Signing key (overrides the configured key)
        #[arg(long, env = SIGNING_KEY_ENV, hide_env_values = true)]
        signing_key: Option<String>,

        /// Token lifetime in seconds (overrides the configured lifetime)
        #[arg(long)]
        expires_in: Option<u64>,
    },

    /// Check an app token and print its payload
    VerifyToken {
        /// The token to check
        token: String,

        /// Signing key (overrides the configured key)
        #[arg(long, env = SIGNING_KEY_ENV, hide_env_values = true)]
        signing_key: Option<String>,
    },

    /// Search the persisted request log, newest first
    ///
    /// Example: migration-cli search-logs user-session --limit 10
    SearchLogs {
        /// Case-insensitive text matched against level, message, method and timestamp
        text: Option<String>,

        /// Log file (defaults to the configured request log)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Matches to skip
        #[arg(long, default_value = "0")]
        skip: usize,

        /// Page size
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Report configuration, security findings and local dependency health
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Load the configuration the server would see
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => AppConfig::load().context("loading configuration"),
    }
}

/// Token service from an explicit key or, failing that, the configuration
pub fn token_service(
    config: &AppConfig,
    signing_key: Option<&str>,
    expires_in: Option<u64>,
) -> JwtTokenService {
    let key = signing_key
        .filter(|k| !k.is_empty())
        .or_else(|| config.auth.signing_key_str());
    JwtTokenService::new(key, expires_in.unwrap_or(config.auth.token_expiration_secs))
}

/// Payload for `issue-token`: session claims or a raw JSON object
pub fn build_payload(
    region: Option<Region>,
    user_id: Option<&str>,
    raw: Option<&str>,
) -> anyhow::Result<TokenPayload> {
    if let Some(raw) = raw {
        let value: Value = serde_json::from_str(raw).context("payload is not valid JSON")?;
        return TokenPayload::from_value(value).context("payload must be a JSON object");
    }

    match (region, user_id) {
        (Some(region), Some(user_id)) => {
            let user_id = UserId::parse(user_id)?;
            Ok(SessionClaims::new(region, user_id).to_payload())
        },
        _ => anyhow::bail!("either --payload or both --region and --user-id are required"),
    }
}

/// Sign `payload`
pub fn issue_token(tokens: &dyn TokenPort, payload: &TokenPayload) -> anyhow::Result<String> {
    tokens
        .issue(payload)
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.code()))
}

/// Verify `token` and return its payload as JSON
pub fn verify_token(tokens: &dyn TokenPort, token: &str) -> anyhow::Result<Value> {
    let payload = tokens
        .verify(token.trim())
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.code()))?;
    Ok(Value::Object(payload.into_inner()))
}

/// Search a JSON-lines request log
pub async fn search_logs(
    file: PathBuf,
    text: Option<&str>,
    skip: usize,
    limit: Option<usize>,
) -> anyhow::Result<LogPage> {
    let service = LogService::new(Arc::new(FileLogSink::new(file)));
    Ok(service.search(text, skip, limit).await?)
}

/// One security finding, flattened for output
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: String,
    pub code: String,
    pub message: String,
}

impl From<&SecurityWarning> for Finding {
    fn from(w: &SecurityWarning) -> Self {
        Self {
            severity: w.severity.to_string(),
            code: w.code.clone(),
            message: w.message.clone(),
        }
    }
}

/// Output of `status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub environment: String,
    pub bind_address: String,
    pub signing_key_configured: bool,
    pub storage_path: PathBuf,
    pub log_file: PathBuf,
    pub findings: Vec<Finding>,
    pub blocks_startup: bool,
    pub health: HealthReport,
}

impl StatusReport {
    /// Whether the server would start and serve with this setup
    pub fn is_ok(&self) -> bool {
        self.health.healthy && !self.blocks_startup
    }
}

/// Build the status report, opening the configured session store
pub async fn status(config: &AppConfig) -> anyhow::Result<StatusReport> {
    let warnings = SecurityValidator::validate(config);
    let store = RedbKeyValueStore::open(&config.storage.path).with_context(|| {
        format!(
            "opening session store at {}",
            config.storage.path.display()
        )
    })?;
    let health = HealthService::new(
        Arc::new(store),
        Arc::new(FileLogSink::new(config.logging.file.clone())),
    )
    .check_all()
    .await;

    Ok(StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        environment: config.environment.unwrap_or_default().to_string(),
        bind_address: config.server.bind_address(),
        signing_key_configured: config.auth.signing_key_str().is_some(),
        storage_path: config.storage.path.clone(),
        log_file: config.logging.file.clone(),
        findings: warnings.iter().map(Finding::from).collect(),
        blocks_startup: SecurityValidator::should_block_startup(config, &warnings),
        health,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn log_filter_verbosity_zero() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn session_claims_payload() {
        let payload = build_payload(Some(Region::AzureEu), Some("blt123"), None).unwrap();
        assert_eq!(payload.get_str("region"), Some("AZURE_EU"));
        assert_eq!(payload.get_str("user_id"), Some("blt123"));
    }

    #[test]
    fn raw_payload_must_be_an_object() {
        let payload = build_payload(None, None, Some(r#"{"id": 1}"#)).unwrap();
        assert_eq!(payload.get("id"), Some(&json!(1)));

        assert!(build_payload(None, None, Some("[1, 2]")).is_err());
        assert!(build_payload(None, None, Some("{not json")).is_err());
    }

    #[test]
    fn payload_needs_some_source() {
        let err = build_payload(None, None, None).unwrap_err();
        assert!(err.to_string().contains("--payload"));
    }

    #[test]
    fn explicit_key_beats_configuration() {
        let config = AppConfig::default();
        let tokens = token_service(&config, Some("cli-key-cli-key-cli-key-cli-key!"), None);
        let payload = build_payload(None, None, Some(r#"{"id": 1}"#)).unwrap();

        let token = issue_token(&tokens, &payload).unwrap();
        assert_eq!(verify_token(&tokens, &token).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn missing_key_reports_code() {
        let tokens = token_service(&AppConfig::default(), Some(""), None);
        let payload = build_payload(None, None, Some(r#"{"id": 1}"#)).unwrap();

        let err = issue_token(&tokens, &payload).unwrap_err();
        assert!(err.to_string().contains("missing_signing_key"));
    }
}
