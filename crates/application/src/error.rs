//! Application-level errors

use domain::{DomainError, ValidationFailure};
use thiserror::Error;

use crate::ports::TokenError;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request failed a validation rule
    #[error("{0}")]
    Validation(String),

    /// Signing or verifying an app token failed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Caller is not authenticated or has no stored session
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// External service could not be reached or answered nonsense
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Required configuration is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    /// Whether the error means the caller failed to authenticate
    pub const fn is_auth(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::Token(e) => !e.is_configuration(),
            _ => false,
        }
    }
}

impl From<ValidationFailure> for ApplicationError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_is_retryable() {
        assert!(ApplicationError::Upstream("timeout".into()).is_retryable());
        assert!(!ApplicationError::Internal("boom".into()).is_retryable());
    }

    #[test]
    fn token_errors_are_auth_except_missing_key() {
        assert!(ApplicationError::from(TokenError::Expired).is_auth());
        assert!(ApplicationError::from(TokenError::InvalidSignature).is_auth());
        assert!(!ApplicationError::from(TokenError::MissingSigningKey).is_auth());
    }

    #[test]
    fn domain_errors_are_transparent() {
        let err = ApplicationError::from(DomainError::InvalidRegion("MARS".into()));
        assert_eq!(err.to_string(), "Invalid region: MARS");
    }

    #[test]
    fn validation_message_is_kept_verbatim() {
        let err = ApplicationError::Validation("Provided email is not valid.".into());
        assert_eq!(err.to_string(), "Provided email is not valid.");
    }
}
