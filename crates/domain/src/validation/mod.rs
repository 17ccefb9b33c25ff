//! Declarative request validation
//!
//! A route declares a [`ValidationSchema`]: an ordered table of
//! [`FieldRule`]s, each naming a field, where it lives in the request and the
//! constraints it must satisfy. One generic evaluator, [`validate`], walks the
//! table and stops at the first failure.
//!
//! Messages are templates where `$` stands for the field name.

mod constraint;
pub mod messages;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use self::constraint::Constraint;
use crate::errors::DomainError;

/// Part of the request a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Body,
    Query,
    Params,
}

impl FieldLocation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Params => "params",
        }
    }
}

impl std::fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints on a single request field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    field: String,
    location: FieldLocation,
    optional: bool,
    checks: Vec<(Constraint, Option<String>)>,
    message: Option<String>,
}

impl FieldRule {
    fn new(location: FieldLocation, field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            location,
            optional: false,
            checks: Vec::new(),
            message: None,
        }
    }

    /// Rule for a JSON body field
    pub fn body(field: impl Into<String>) -> Self {
        Self::new(FieldLocation::Body, field)
    }

    /// Rule for a query string parameter
    pub fn query(field: impl Into<String>) -> Self {
        Self::new(FieldLocation::Query, field)
    }

    /// Rule for a path parameter
    pub fn params(field: impl Into<String>) -> Self {
        Self::new(FieldLocation::Params, field)
    }

    /// Skip the rule entirely when the field is absent or null
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Append a constraint
    #[must_use]
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.checks.push((constraint, None));
        self
    }

    /// Append a constraint with its own message template
    #[must_use]
    pub fn with_message(mut self, constraint: Constraint, template: impl Into<String>) -> Self {
        self.checks.push((constraint, Some(template.into())));
        self
    }

    /// Message template used by constraints that don't carry their own
    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(template.into());
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub const fn location(&self) -> FieldLocation {
        self.location
    }

    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    fn check(&self, fields: &RequestFields) -> Result<(), ValidationFailure> {
        let value = fields
            .lookup(self.location, &self.field)
            .filter(|v| !v.is_null());

        if value.is_none() && self.optional {
            return Ok(());
        }

        for (constraint, template) in &self.checks {
            if !constraint.is_satisfied_by(value, self.location) {
                let template = template
                    .as_deref()
                    .or(self.message.as_deref())
                    .unwrap_or_else(|| constraint.default_message());
                return Err(ValidationFailure {
                    field: self.field.clone(),
                    location: self.location,
                    message: messages::render(template, &self.field),
                });
            }
        }
        Ok(())
    }
}

/// Ordered table of field rules for one route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSchema {
    rules: Vec<FieldRule>,
}

impl ValidationSchema {
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// See [`validate`]
    pub fn validate(&self, fields: &RequestFields) -> Result<(), ValidationFailure> {
        validate(self, fields)
    }
}

impl FromIterator<FieldRule> for ValidationSchema {
    fn from_iter<I: IntoIterator<Item = FieldRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// The parts of a request that rules can inspect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFields {
    pub body: Value,
    pub query: Map<String, Value>,
    pub params: Map<String, Value>,
}

impl RequestFields {
    pub fn lookup(&self, location: FieldLocation, field: &str) -> Option<&Value> {
        match location {
            FieldLocation::Body => self.body.as_object().and_then(|body| body.get(field)),
            FieldLocation::Query => self.query.get(field),
            FieldLocation::Params => self.params.get(field),
        }
    }
}

/// First rule a request failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationFailure {
    pub field: String,
    pub location: FieldLocation,
    pub message: String,
}

impl From<ValidationFailure> for DomainError {
    fn from(failure: ValidationFailure) -> Self {
        Self::ValidationError(failure.message)
    }
}

/// Evaluate a schema against a request
///
/// Rules run in declaration order and constraints within a rule run in
/// order. The first failure is returned; nothing after it is evaluated.
pub fn validate(
    schema: &ValidationSchema,
    fields: &RequestFields,
) -> Result<(), ValidationFailure> {
    schema.rules.iter().try_for_each(|rule| rule.check(fields))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn login_schema() -> ValidationSchema {
        ValidationSchema::new()
            .rule(
                FieldRule::body("email")
                    .with(Constraint::Required)
                    .with(Constraint::String)
                    .with_message(Constraint::Email, messages::INVALID_EMAIL),
            )
            .rule(
                FieldRule::body("affix_confirmation")
                    .optional()
                    .with(Constraint::Boolean),
            )
    }

    fn body(value: Value) -> RequestFields {
        RequestFields {
            body: value,
            ..RequestFields::default()
        }
    }

    #[test]
    fn valid_request_passes() {
        let fields = body(json!({"email": "a@b.io", "affix_confirmation": true}));
        assert!(validate(&login_schema(), &fields).is_ok());
    }

    #[test]
    fn absent_optional_field_is_skipped() {
        assert!(validate(&login_schema(), &body(json!({"email": "a@b.io"}))).is_ok());
        assert!(
            validate(
                &login_schema(),
                &body(json!({"email": "a@b.io", "affix_confirmation": null}))
            )
            .is_ok()
        );
    }

    #[test]
    fn non_boolean_flag_names_the_field() {
        let fields = body(json!({"email": "a@b.io", "affix_confirmation": "yes"}));
        let failure = validate(&login_schema(), &fields).unwrap_err();
        assert_eq!(failure.field, "affix_confirmation");
        assert_eq!(failure.location, FieldLocation::Body);
        assert!(failure.message.contains("affix_confirmation"));
    }

    #[test]
    fn first_failing_rule_wins() {
        let fields = body(json!({"email": "nope", "affix_confirmation": 3}));
        let failure = validate(&login_schema(), &fields).unwrap_err();
        assert_eq!(failure.field, "email");
        assert_eq!(failure.message, messages::render(messages::INVALID_EMAIL, "email"));
    }

    #[test]
    fn first_failing_constraint_wins() {
        let failure = validate(&login_schema(), &body(json!({}))).unwrap_err();
        assert_eq!(failure.message, "email is required.");
    }

    #[test]
    fn rule_message_overrides_defaults() {
        let schema = ValidationSchema::new().rule(
            FieldRule::body("region")
                .with(Constraint::String)
                .with(Constraint::one_of(["NA", "EU"]))
                .message(messages::INVALID_REGION),
        );
        let failure = validate(&schema, &body(json!({"region": "MARS"}))).unwrap_err();
        assert_eq!(failure.message, messages::render(messages::INVALID_REGION, "region"));

        let failure = validate(&schema, &body(json!({"region": 5}))).unwrap_err();
        assert_eq!(failure.message, messages::render(messages::INVALID_REGION, "region"));
    }

    #[test]
    fn reads_query_and_params() {
        let schema: ValidationSchema = [
            FieldRule::params("projectId").with(Constraint::NonEmpty),
            FieldRule::query("dryRun").optional().with(Constraint::Boolean),
        ]
        .into_iter()
        .collect();

        let mut fields = RequestFields::default();
        fields.params.insert("projectId".into(), json!("p1"));
        fields.query.insert("dryRun".into(), json!("false"));
        assert!(schema.validate(&fields).is_ok());

        fields.query.insert("dryRun".into(), json!("maybe"));
        let failure = schema.validate(&fields).unwrap_err();
        assert_eq!(failure.location, FieldLocation::Query);

        fields.params.insert("projectId".into(), json!("  "));
        let failure = schema.validate(&fields).unwrap_err();
        assert_eq!(failure.field, "projectId");
    }

    #[test]
    fn non_object_body_has_no_fields() {
        let failure = validate(&login_schema(), &body(json!([1, 2]))).unwrap_err();
        assert_eq!(failure.field, "email");
    }

    #[test]
    fn failure_converts_to_domain_error() {
        let failure = validate(&login_schema(), &body(json!({}))).unwrap_err();
        assert_eq!(
            DomainError::from(failure),
            DomainError::ValidationError("email is required.".to_string())
        );
    }
}
