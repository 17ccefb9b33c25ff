//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Region name is not one of the supported regions
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// User identifier is empty or malformed
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// Token payload is not a claim map or uses reserved claim names
    #[error("Invalid token payload: {0}")]
    InvalidTokenPayload(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Project", "p-1");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Project");
                assert_eq!(id, "p-1");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Project", "p-1");
        assert_eq!(err.to_string(), "Project not found: p-1");
    }

    #[test]
    fn invalid_region_error_message() {
        let err = DomainError::InvalidRegion("MARS".to_string());
        assert_eq!(err.to_string(), "Invalid region: MARS");
    }

    #[test]
    fn invalid_payload_error_message() {
        let err = DomainError::InvalidTokenPayload("reserved claim exp".to_string());
        assert_eq!(err.to_string(), "Invalid token payload: reserved claim exp");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("field is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: field is required");
    }
}
