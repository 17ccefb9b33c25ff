//! Port for the CMS identity API (login, SMS two-factor, user profile)

use async_trait::async_trait;
use domain::Region;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use super::{ServiceResponse, UpstreamSession};
use crate::error::ApplicationError;

/// Credentials submitted by a user signing in
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfa_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("tfa_token", &self.tfa_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            tfa_token: None,
        }
    }

    #[must_use]
    pub fn with_tfa_token(mut self, token: impl Into<String>) -> Self {
        self.tfa_token = Some(token.into());
        self
    }
}

/// Identity API of the CMS, addressed per region
///
/// Non-2xx answers are returned as a [`ServiceResponse`]; only transport
/// failures become errors. `request_id` is forwarded as `X-Request-Id`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityProviderPort: Send + Sync {
    /// Create a user session
    async fn login(
        &self,
        region: Region,
        credentials: &Credentials,
        request_id: Option<String>,
    ) -> Result<ServiceResponse, ApplicationError>;

    /// Ask the provider to text a two-factor code to the user
    async fn request_sms_token(
        &self,
        region: Region,
        credentials: &Credentials,
        request_id: Option<String>,
    ) -> Result<ServiceResponse, ApplicationError>;

    /// Fetch the signed-in user, including organisation roles
    async fn user_profile(
        &self,
        session: &UpstreamSession,
    ) -> Result<ServiceResponse, ApplicationError>;
}
