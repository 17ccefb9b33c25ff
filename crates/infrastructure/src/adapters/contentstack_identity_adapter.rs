//! CMS identity API adapter - Implements IdentityProviderPort over HTTP

use application::{
    ApplicationError, Credentials, IdentityProviderPort, ServiceResponse, UpstreamSession,
};
use async_trait::async_trait;
use domain::Region;
use serde_json::json;
use tracing::{debug, instrument};

use super::upstream_response::{relay, transport_error};
use crate::{
    config::{RegionsConfig, UpstreamConfig},
    http::{CorrelatedClientConfig, CorrelatedHttpClient},
};

const SERVICE: &str = "CMS identity API";

/// Talks to the identity endpoints of the region the caller picked
#[derive(Debug, Clone)]
pub struct ContentstackIdentityProvider {
    client: CorrelatedHttpClient,
    regions: RegionsConfig,
}

impl ContentstackIdentityProvider {
    pub const fn new(client: CorrelatedHttpClient, regions: RegionsConfig) -> Self {
        Self { client, regions }
    }

    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(
        regions: RegionsConfig,
        upstream: &UpstreamConfig,
    ) -> Result<Self, ApplicationError> {
        let client = CorrelatedHttpClient::with_config(CorrelatedClientConfig::from(upstream))
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::new(client, regions))
    }

    fn url(&self, region: Region, path: &str) -> String {
        format!(
            "{}{path}",
            self.regions.endpoints(region).api_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl IdentityProviderPort for ContentstackIdentityProvider {
    #[instrument(skip(self, credentials), fields(region = region.as_str()))]
    async fn login(
        &self,
        region: Region,
        credentials: &Credentials,
        request_id: Option<String>,
    ) -> Result<ServiceResponse, ApplicationError> {
        let response = self
            .client
            .post(self.url(region, "/user-session"))
            .with_request_id(&request_id)
            .json(&json!({ "user": credentials }))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        debug!(status = response.status().as_u16(), "Login answered");
        relay(SERVICE, response).await
    }

    #[instrument(skip(self, credentials), fields(region = region.as_str()))]
    async fn request_sms_token(
        &self,
        region: Region,
        credentials: &Credentials,
        request_id: Option<String>,
    ) -> Result<ServiceResponse, ApplicationError> {
        let body = json!({
            "user": {
                "email": credentials.email,
                "password": credentials.password,
            }
        });

        let response = self
            .client
            .post(self.url(region, "/user/request_token_sms"))
            .with_request_id(&request_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        relay(SERVICE, response).await
    }

    #[instrument(skip(self, session), fields(region = session.region.as_str()))]
    async fn user_profile(
        &self,
        session: &UpstreamSession,
    ) -> Result<ServiceResponse, ApplicationError> {
        let response = self
            .client
            .get(self.url(session.region, "/user"))
            .with_request_id(session)
            .query(&[("include_orgs_roles", "true")])
            .header("authtoken", &session.authtoken)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        relay(SERVICE, response).await
    }
}
