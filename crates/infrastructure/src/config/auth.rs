//! App token signing configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Signing settings for app tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC key used to sign app tokens (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub signing_key: Option<SecretString>,

    /// Lifetime of an issued app token in seconds
    #[serde(default = "default_token_expiration")]
    pub token_expiration_secs: u64,
}

const fn default_token_expiration() -> u64 {
    60 * 60 * 24 // 1 day
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: None,
            token_expiration_secs: default_token_expiration(),
        }
    }
}

impl AuthConfig {
    /// The signing key, if one is configured and non-empty
    #[must_use]
    pub fn signing_key_str(&self) -> Option<&str> {
        self.signing_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|key| !key.is_empty())
    }
}
