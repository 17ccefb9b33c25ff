//! Login and two-factor token requests
//!
//! Login is delegated to the CMS identity API. On success the CMS authtoken
//! is kept server-side and the caller receives a signed app token carrying
//! only `{region, user_id}`.

use std::{fmt, sync::Arc};

use domain::{Region, SessionClaims, UserId};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{Credentials, IdentityProviderPort, ServiceResponse, TokenPort},
    services::session_store::{SessionStore, StoredSession},
};

/// Message returned with a freshly issued app token
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login Successful.";

/// Sign-in attempt
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub region: Region,
    pub credentials: Credentials,
    /// Correlation id of the inbound request
    pub request_id: Option<String>,
}

impl LoginRequest {
    pub const fn new(region: Region, credentials: Credentials) -> Self {
        Self {
            region,
            credentials,
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(ToOwned::to_owned);
        self
    }
}

/// Authentication use cases
pub struct AuthService {
    identity: Arc<dyn IdentityProviderPort>,
    tokens: Arc<dyn TokenPort>,
    sessions: SessionStore,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProviderPort>,
        tokens: Arc<dyn TokenPort>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            identity,
            tokens,
            sessions,
        }
    }

    /// Sign a user in and issue an app token
    ///
    /// Any non-200 answer from the identity API is returned unchanged.
    #[instrument(skip(self, request), fields(region = %request.region))]
    pub async fn login(&self, request: &LoginRequest) -> Result<ServiceResponse, ApplicationError> {
        let response = self
            .identity
            .login(
                request.region,
                &request.credentials,
                request.request_id.clone(),
            )
            .await?;

        if response.status != 200 {
            warn!(status = response.status, "Identity provider rejected login");
            return Ok(response);
        }

        let (uid, authtoken) = session_fields(&response)?;
        let claims = SessionClaims::new(request.region, UserId::parse(uid)?);

        self.sessions
            .save(&StoredSession::new(&claims, authtoken))
            .await?;
        let app_token = self.tokens.issue(&claims.to_payload())?;

        info!(user_id = %claims.user_id, "User logged in");
        Ok(ServiceResponse::ok(json!({
            "message": LOGIN_SUCCESS_MESSAGE,
            "app_token": app_token,
        })))
    }

    /// Ask the identity API to send an SMS two-factor code
    #[instrument(skip(self, credentials))]
    pub async fn request_sms_token(
        &self,
        region: Region,
        credentials: &Credentials,
        request_id: Option<&str>,
    ) -> Result<ServiceResponse, ApplicationError> {
        self.identity
            .request_sms_token(region, credentials, request_id.map(ToOwned::to_owned))
            .await
    }
}

fn session_fields(response: &ServiceResponse) -> Result<(&str, &str), ApplicationError> {
    let user = &response.data["user"];
    match (user["uid"].as_str(), user["authtoken"].as_str()) {
        (Some(uid), Some(authtoken)) => Ok((uid, authtoken)),
        _ => Err(ApplicationError::Upstream(
            "Login response did not contain a user session".into(),
        )),
    }
}
