//! Domain layer for the migration gateway
//!
//! Contains the token payload, log entry, request validation rules and
//! redaction policy. This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod redaction;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use redaction::{REDACTED, SENSITIVE_FIELDS, is_sensitive, redact_value};
pub use validation::{
    Constraint, FieldLocation, FieldRule, RequestFields, ValidationFailure, ValidationSchema,
    messages, validate,
};
pub use value_objects::*;
