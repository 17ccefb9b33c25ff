//! Login and SMS two-factor handlers

use std::sync::LazyLock;

use application::{Credentials, LoginRequest};
use axum::{Extension, extract::State, response::Response};
use domain::{Constraint, FieldRule, Region, ValidationSchema, messages};
use serde::Deserialize;

use super::relay;
use crate::{
    error::ApiError,
    middleware::{RequestId, RequestSchema, Validated},
    state::AppState,
};

/// Longest accepted email address
const MAX_EMAIL_LEN: usize = 350;

fn email_rule() -> FieldRule {
    FieldRule::body("email")
        .with(Constraint::Required)
        .with(Constraint::String)
        .with(Constraint::MaxLength(MAX_EMAIL_LEN))
        .with(Constraint::Email)
}

fn password_rule() -> FieldRule {
    FieldRule::body("password")
        .with(Constraint::Required)
        .with(Constraint::String)
        .with(Constraint::NonEmpty)
}

fn region_rule() -> FieldRule {
    FieldRule::body("region")
        .with(Constraint::Required)
        .with_message(Constraint::String, messages::INVALID_REGION)
        .with_message(Constraint::OneOf(Region::names()), messages::INVALID_REGION)
}

/// Body of `POST /user-session`
///
/// `affix_confirmation` is accepted for client compatibility. It must be a
/// boolean when present and is not forwarded.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
    pub region: Region,
    #[serde(default)]
    pub tfa_token: Option<String>,
}

impl RequestSchema for LoginBody {
    fn schema() -> &'static ValidationSchema {
        static SCHEMA: LazyLock<ValidationSchema> = LazyLock::new(|| {
            ValidationSchema::new()
                .rule(email_rule())
                .rule(password_rule())
                .rule(region_rule())
                .rule(FieldRule::body("tfa_token").optional().with(Constraint::String))
                .rule(
                    FieldRule::body("affix_confirmation")
                        .optional()
                        .with(Constraint::Boolean),
                )
        });
        &SCHEMA
    }
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        let mut credentials = Credentials::new(body.email, body.password);
        if let Some(token) = body.tfa_token {
            credentials = credentials.with_tfa_token(token);
        }
        Self::new(body.region, credentials)
    }
}

/// Body of `POST /request-token-sms`
#[derive(Debug, Clone, Deserialize)]
pub struct SmsTokenBody {
    pub email: String,
    pub password: String,
    pub region: Region,
}

impl RequestSchema for SmsTokenBody {
    fn schema() -> &'static ValidationSchema {
        static SCHEMA: LazyLock<ValidationSchema> = LazyLock::new(|| {
            [email_rule(), password_rule(), region_rule()]
                .into_iter()
                .collect()
        });
        &SCHEMA
    }
}

/// Sign in and receive an app token
pub async fn login(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Validated(body): Validated<LoginBody>,
) -> Result<Response, ApiError> {
    let request = LoginRequest::from(body)
        .with_request_id(request_id.as_ref().map(|Extension(id)| id.as_str()));
    let response = state.auth_service.login(&request).await?;
    Ok(relay(response))
}

/// Have the CMS text a two-factor code to the user
pub async fn request_sms_token(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Validated(body): Validated<SmsTokenBody>,
) -> Result<Response, ApiError> {
    let credentials = Credentials::new(body.email, body.password);
    let request_id = request_id.as_ref().map(|Extension(id)| id.as_str());
    let response = state
        .auth_service
        .request_sms_token(body.region, &credentials, request_id)
        .await?;
    Ok(relay(response))
}

#[cfg(test)]
mod tests {
    use domain::{RequestFields, validate};
    use serde_json::{Value, json};

    use super::*;

    fn check(schema: &ValidationSchema, body: Value) -> Result<(), String> {
        let fields = RequestFields {
            body,
            ..RequestFields::default()
        };
        validate(schema, &fields).map_err(|f| f.message)
    }

    fn login_body() -> Value {
        json!({
            "email": "dev@example.com",
            "password": "pw",
            "region": "NA",
        })
    }

    #[test]
    fn complete_login_passes() {
        let mut body = login_body();
        body["tfa_token"] = json!("123456");
        body["affix_confirmation"] = json!(true);
        assert!(check(LoginBody::schema(), body).is_ok());
    }

    #[test]
    fn affix_confirmation_must_be_boolean() {
        let mut body = login_body();
        body["affix_confirmation"] = json!("true");
        let message = check(LoginBody::schema(), body).unwrap_err();
        assert!(message.contains("affix_confirmation"));
    }

    #[test]
    fn unknown_region_is_rejected() {
        let mut body = login_body();
        body["region"] = json!("MARS");
        assert_eq!(
            check(LoginBody::schema(), body).unwrap_err(),
            "Provided region is not a supported region."
        );
    }

    #[test]
    fn overlong_email_is_rejected() {
        let mut body = login_body();
        body["email"] = json!(format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN)));
        assert_eq!(
            check(LoginBody::schema(), body).unwrap_err(),
            "Provided email is too long."
        );
    }

    #[test]
    fn length_is_checked_before_address_shape() {
        let mut body = login_body();
        body["email"] = json!("a".repeat(MAX_EMAIL_LEN + 1));
        assert_eq!(
            check(LoginBody::schema(), body).unwrap_err(),
            "Provided email is too long."
        );

        let mut body = login_body();
        body["email"] = json!(format!("{}@example.com", "a".repeat(70)));
        assert_eq!(
            check(LoginBody::schema(), body).unwrap_err(),
            "Provided email is not a valid email address."
        );
    }

    #[test]
    fn sms_schema_requires_password() {
        let mut body = login_body();
        body.as_object_mut().unwrap().remove("password");
        assert_eq!(
            check(SmsTokenBody::schema(), body).unwrap_err(),
            "password is required."
        );
    }

    #[test]
    fn login_body_converts_to_request() {
        let body: LoginBody = serde_json::from_value(json!({
            "email": "dev@example.com",
            "password": "pw",
            "region": "AZURE_EU",
            "tfa_token": "42",
            "affix_confirmation": true,
        }))
        .unwrap();
        let request = LoginRequest::from(body);
        assert_eq!(request.region, Region::AzureEu);
        assert_eq!(request.credentials.tfa_token.as_deref(), Some("42"));
        assert!(request.request_id.is_none());
        assert!(
            !serde_json::to_string(&request.credentials)
                .unwrap()
                .contains("affix_confirmation")
        );
    }
}
