//! Security validation for application configuration
//!
//! Validates configuration for security issues and provides warnings at startup.
//! Critical issues in production will prevent startup unless explicitly allowed.

use std::fmt;

use domain::Region;

use crate::config::AppConfig;

/// Severity level for security warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Informational - no action required
    Info,
    /// Warning - should be addressed but not critical
    Warning,
    /// Critical - must be addressed in production
    Critical,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A security warning with severity and description
#[derive(Debug, Clone)]
pub struct SecurityWarning {
    /// Severity level of the warning
    pub severity: WarningSeverity,
    /// Short code identifying the warning type
    pub code: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Recommended action to resolve the issue
    pub recommendation: String,
}

impl SecurityWarning {
    /// Create a new security warning
    #[must_use]
    pub fn new(
        severity: WarningSeverity,
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Create a critical warning
    #[must_use]
    pub fn critical(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Critical, code, message, recommendation)
    }

    /// Create a warning-level issue
    #[must_use]
    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Warning, code, message, recommendation)
    }

    /// Create an informational notice
    #[must_use]
    pub fn info(
        code: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(WarningSeverity::Info, code, message, recommendation)
    }

    /// Check if this warning is critical
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.severity, WarningSeverity::Critical)
    }
}

impl fmt::Display for SecurityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} - {}",
            self.severity, self.code, self.message, self.recommendation
        )
    }
}

/// Environment variable that lets a production instance start despite critical findings
pub const ALLOW_INSECURE_ENV: &str = "MIGRATION_ALLOW_INSECURE_CONFIG";

/// Minimum signing key length in bytes
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Validates application configuration for security issues
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityValidator;

impl SecurityValidator {
    /// Validate configuration and return all security warnings
    ///
    /// Returns a list of warnings sorted by severity (critical first).
    #[must_use]
    pub fn validate(config: &AppConfig) -> Vec<SecurityWarning> {
        let mut warnings = Vec::new();
        let is_production = config.is_production();

        Self::check_signing_key(config, is_production, &mut warnings);
        Self::check_cors_configuration(config, is_production, &mut warnings);
        Self::check_error_exposure(config, is_production, &mut warnings);
        Self::check_upstream_transport(config, is_production, &mut warnings);

        warnings.sort_by(|a, b| b.severity.cmp(&a.severity));

        warnings
    }

    /// Check if startup should be blocked due to critical security issues
    ///
    /// Returns `true` if the server should refuse to start.
    #[must_use]
    pub fn should_block_startup(config: &AppConfig, warnings: &[SecurityWarning]) -> bool {
        let has_critical = warnings.iter().any(SecurityWarning::is_critical);
        let allow_insecure = std::env::var(ALLOW_INSECURE_ENV)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        config.is_production() && has_critical && !allow_insecure
    }

    /// Log all warnings using tracing
    pub fn log_warnings(warnings: &[SecurityWarning]) {
        for warning in warnings {
            match warning.severity {
                WarningSeverity::Critical => {
                    tracing::error!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration issue"
                    );
                },
                WarningSeverity::Warning => {
                    tracing::warn!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration warning"
                    );
                },
                WarningSeverity::Info => {
                    tracing::info!(
                        code = %warning.code,
                        message = %warning.message,
                        recommendation = %warning.recommendation,
                        "Security configuration notice"
                    );
                },
            }
        }
    }

    fn check_signing_key(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        match config.auth.signing_key_str() {
            None => warnings.push(SecurityWarning::critical(
                "SEC001",
                "No app token signing key configured; login and authenticated routes will fail",
                "Set MIGRATION_AUTH__SIGNING_KEY to a random value of at least 32 bytes",
            )),
            Some(key) if key.len() < MIN_SIGNING_KEY_LEN => {
                let severity = if is_production {
                    WarningSeverity::Critical
                } else {
                    WarningSeverity::Warning
                };
                warnings.push(SecurityWarning::new(
                    severity,
                    "SEC002",
                    format!("App token signing key is shorter than {MIN_SIGNING_KEY_LEN} bytes"),
                    "Use a longer random signing key",
                ));
            },
            Some(_) => {},
        }
    }

    fn check_cors_configuration(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if config.server.cors_enabled && config.server.allowed_origins.is_empty() {
            let severity = if is_production {
                WarningSeverity::Critical
            } else {
                WarningSeverity::Info
            };

            warnings.push(SecurityWarning::new(
                severity,
                "SEC003",
                "CORS is enabled with no origin restrictions (allows all origins)",
                "Specify allowed_origins in production to restrict cross-origin requests",
            ));
        }
    }

    fn check_error_exposure(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if config.server.expose_internal_errors && is_production {
            warnings.push(SecurityWarning::warning(
                "SEC004",
                "Internal error details are returned to API clients",
                "Disable server.expose_internal_errors in production",
            ));
        }
    }

    fn check_upstream_transport(
        config: &AppConfig,
        is_production: bool,
        warnings: &mut Vec<SecurityWarning>,
    ) {
        if !is_production {
            return;
        }

        for region in Region::ALL {
            let endpoints = config.regions.endpoints(region);
            if !endpoints.api_url.starts_with("https://") {
                warnings.push(SecurityWarning::critical(
                    "SEC005",
                    format!("{} API endpoint does not use HTTPS", region.as_str()),
                    "Configure an https:// api_url; CMS credentials travel over this connection",
                ));
            }
        }

        if !config.migration.base_url.starts_with("https://") {
            warnings.push(SecurityWarning::info(
                "SEC006",
                "Migration service is reached over plain HTTP",
                "Keep the migration service on a private network or switch to HTTPS",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{Environment, RegionsConfig};

    const STRONG_KEY: &str = "0123456789abcdef0123456789abcdef";

    fn create_test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.signing_key = Some(SecretString::from(STRONG_KEY.to_string()));
        config
    }

    fn create_production_config() -> AppConfig {
        AppConfig {
            environment: Some(Environment::Production),
            ..create_test_config()
        }
    }

    #[test]
    fn validate_returns_no_critical_for_secure_config() {
        let mut config = create_production_config();
        config.server.allowed_origins = vec!["https://app.example.com".to_string()];

        let warnings = SecurityValidator::validate(&config);

        assert!(warnings.iter().all(|w| !w.is_critical()));
    }

    #[test]
    fn missing_signing_key_is_critical() {
        let config = AppConfig::default();

        let warnings = SecurityValidator::validate(&config);

        let warning = warnings.iter().find(|w| w.code == "SEC001").unwrap();
        assert!(warning.is_critical());
    }

    #[test]
    fn short_signing_key_severity_depends_on_environment() {
        let mut dev = create_test_config();
        dev.auth.signing_key = Some(SecretString::from("short".to_string()));
        let mut prod = create_production_config();
        prod.auth.signing_key = Some(SecretString::from("short".to_string()));

        let dev_warning = SecurityValidator::validate(&dev)
            .into_iter()
            .find(|w| w.code == "SEC002")
            .unwrap();
        let prod_warning = SecurityValidator::validate(&prod)
            .into_iter()
            .find(|w| w.code == "SEC002")
            .unwrap();

        assert_eq!(dev_warning.severity, WarningSeverity::Warning);
        assert!(prod_warning.is_critical());
    }

    #[test]
    fn validate_warns_on_empty_cors_origins() {
        let config = create_test_config();

        let warnings = SecurityValidator::validate(&config);

        let warning = warnings.iter().find(|w| w.code == "SEC003").unwrap();
        assert_eq!(warning.severity, WarningSeverity::Info);
    }

    #[test]
    fn validate_critical_cors_in_production() {
        let config = create_production_config();

        let warnings = SecurityValidator::validate(&config);

        let cors_warning = warnings.iter().find(|w| w.code == "SEC003").unwrap();
        assert!(cors_warning.is_critical());
    }

    #[test]
    fn exposed_errors_warn_in_production_only() {
        let mut dev = create_test_config();
        dev.server.expose_internal_errors = true;
        let mut prod = create_production_config();
        prod.server.expose_internal_errors = true;

        assert!(!SecurityValidator::validate(&dev).iter().any(|w| w.code == "SEC004"));
        assert!(SecurityValidator::validate(&prod).iter().any(|w| w.code == "SEC004"));
    }

    #[test]
    fn plain_http_region_is_critical_in_production() {
        let mut config = create_production_config();
        config.regions = RegionsConfig::uniform("http://cms.internal/v3", "http://cms.internal");

        let warnings = SecurityValidator::validate(&config);

        let region_warnings: Vec<_> = warnings.iter().filter(|w| w.code == "SEC005").collect();
        assert_eq!(region_warnings.len(), Region::ALL.len());
        assert!(region_warnings.iter().all(|w| w.is_critical()));
    }

    #[test]
    fn plain_http_migration_service_is_informational() {
        let config = create_production_config();

        let warnings = SecurityValidator::validate(&config);

        let warning = warnings.iter().find(|w| w.code == "SEC006").unwrap();
        assert_eq!(warning.severity, WarningSeverity::Info);
    }

    #[test]
    fn should_block_startup_in_production_with_critical() {
        let config = create_production_config();
        let warnings = vec![SecurityWarning::critical("TEST", "Test critical", "Fix it")];

        assert!(SecurityValidator::should_block_startup(&config, &warnings));
    }

    #[test]
    fn should_not_block_startup_in_development() {
        let config = create_test_config();
        let warnings = vec![SecurityWarning::critical("TEST", "Test critical", "Fix it")];

        assert!(!SecurityValidator::should_block_startup(&config, &warnings));
    }

    #[test]
    fn should_not_block_startup_without_critical() {
        let config = create_production_config();
        let warnings = vec![SecurityWarning::warning("TEST", "Test warning", "Fix it")];

        assert!(!SecurityValidator::should_block_startup(&config, &warnings));
    }

    #[test]
    fn warnings_sorted_by_severity() {
        let config = AppConfig {
            environment: Some(Environment::Production),
            ..AppConfig::default()
        };

        let warnings = SecurityValidator::validate(&config);

        assert!(warnings.len() > 1);
        assert!(warnings.windows(2).all(|w| w[0].severity >= w[1].severity));
    }

    #[test]
    fn warning_display_format() {
        let warning = SecurityWarning::critical("SEC001", "Test message", "Test recommendation");

        let display = format!("{warning}");

        assert!(display.contains("CRITICAL"));
        assert!(display.contains("SEC001"));
        assert!(display.contains("Test message"));
        assert!(display.contains("Test recommendation"));
    }

    #[test]
    fn severity_ordering() {
        assert!(WarningSeverity::Critical > WarningSeverity::Warning);
        assert!(WarningSeverity::Warning > WarningSeverity::Info);
    }
}
