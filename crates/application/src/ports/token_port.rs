//! Port for issuing and verifying signed app tokens

use domain::TokenPayload;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Failures of the token utility
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No signing key is configured
    #[error("Signing key is not configured")]
    MissingSigningKey,

    /// The token's expiration has elapsed
    #[error("Token has expired")]
    Expired,

    /// The signature does not match the configured key
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// The token could not be parsed
    #[error("Token is malformed: {0}")]
    Malformed(String),

    /// Encoding the token failed
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Whether the failure is a server-side setup problem rather than a bad token
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingSigningKey | Self::Signing(_))
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingSigningKey => "missing_signing_key",
            Self::Expired => "token_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::Malformed(_) => "malformed_token",
            Self::Signing(_) => "token_signing_failed",
        }
    }
}

/// Signs payloads into app tokens and recovers them again
///
/// `verify(issue(p))` yields exactly `p` until the token expires.
#[cfg_attr(test, automock)]
pub trait TokenPort: Send + Sync {
    /// Sign a payload, embedding issue and expiration times
    fn issue(&self, payload: &TokenPayload) -> Result<String, TokenError>;

    /// Check signature and expiration, returning the original payload
    fn verify(&self, token: &str) -> Result<TokenPayload, TokenError>;
}
