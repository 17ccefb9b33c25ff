use serde_json::Value;
use validator::ValidateEmail;

use super::{FieldLocation, messages};

/// A single check applied to a field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Present and not null
    Required,
    String,
    /// JSON boolean in the body; `"true"`/`"false"` in query or path
    Boolean,
    /// Non-blank string, or non-empty array/object
    NonEmpty,
    Email,
    /// Maximum length in characters
    MaxLength(usize),
    /// Exact match against a fixed set of strings
    OneOf(Vec<String>),
    Uuid,
}

impl Constraint {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub(crate) const fn default_message(&self) -> &'static str {
        match self {
            Self::Required => messages::REQUIRED,
            Self::String => messages::STRING_REQUIRED,
            Self::Boolean => messages::BOOLEAN_REQUIRED,
            Self::NonEmpty => messages::EMPTY,
            Self::Email => messages::INVALID_EMAIL,
            Self::MaxLength(_) => messages::LENGTH,
            Self::OneOf(_) => messages::INVALID_VALUE,
            Self::Uuid => messages::INVALID_UUID,
        }
    }

    pub(crate) fn is_satisfied_by(&self, value: Option<&Value>, location: FieldLocation) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Self::Required => !value.is_null(),
            Self::String => value.is_string(),
            Self::Boolean => match (value, location) {
                (Value::Bool(_), _) => true,
                (Value::String(s), FieldLocation::Query | FieldLocation::Params) => {
                    matches!(s.as_str(), "true" | "false")
                },
                _ => false,
            },
            Self::NonEmpty => match value {
                Value::String(s) => !s.trim().is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(map) => !map.is_empty(),
                Value::Null => false,
                Value::Bool(_) | Value::Number(_) => true,
            },
            Self::Email => value.as_str().is_some_and(|s| s.validate_email()),
            Self::MaxLength(max) => value.as_str().is_some_and(|s| s.chars().count() <= *max),
            Self::OneOf(allowed) => value
                .as_str()
                .is_some_and(|s| allowed.iter().any(|a| a == s)),
            Self::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
        }
    }
}
