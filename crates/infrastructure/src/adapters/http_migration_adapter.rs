//! Migration service adapter - Implements MigrationPort over HTTP

use application::{ApplicationError, MigrationPort, ServiceResponse, UpstreamSession};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::Value;
use tracing::instrument;

use super::upstream_response::{relay, transport_error};
use crate::{
    config::{MigrationConfig, UpstreamConfig},
    http::{CorrelatedClientConfig, CorrelatedHttpClient, CorrelatedRequestBuilder},
};

const SERVICE: &str = "Migration service";

/// Forwards project calls to the migration engine
#[derive(Debug, Clone)]
pub struct HttpMigrationService {
    client: CorrelatedHttpClient,
    base_url: Url,
}

impl HttpMigrationService {
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(client: CorrelatedHttpClient, base_url: &str) -> Result<Self, ApplicationError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ApplicationError::Configuration(format!("Invalid migration base URL: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApplicationError::Configuration(format!(
                "Migration base URL cannot carry paths: {base_url}"
            )));
        }
        Ok(Self { client, base_url })
    }

    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize or the base
    /// URL is invalid.
    pub fn from_config(
        migration: &MigrationConfig,
        upstream: &UpstreamConfig,
    ) -> Result<Self, ApplicationError> {
        let client = CorrelatedHttpClient::with_config(CorrelatedClientConfig::from(upstream))
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Self::new(client, &migration.base_url)
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(
        &self,
        method: Method,
        session: &UpstreamSession,
        segments: &[&str],
    ) -> CorrelatedRequestBuilder {
        self.client
            .request(method, self.endpoint(segments))
            .header("authtoken", session.authtoken.as_str())
            .header("region", session.region.as_str())
            .header("user-id", session.user_id.as_str())
            .with_request_id(session)
    }

    async fn send(builder: CorrelatedRequestBuilder) -> Result<ServiceResponse, ApplicationError> {
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;
        relay(SERVICE, response).await
    }
}

#[async_trait]
impl MigrationPort for HttpMigrationService {
    #[instrument(skip(self, session, body), fields(user_id = %session.user_id))]
    async fn field_mapping(
        &self,
        session: &UpstreamSession,
        org_id: &str,
        project_id: &str,
        body: Value,
    ) -> Result<ServiceResponse, ApplicationError> {
        let builder = self
            .request(Method::POST, session, &["test-stack", org_id, project_id])
            .json(&body);
        Self::send(builder).await
    }

    #[instrument(skip(self, session, body), fields(user_id = %session.user_id))]
    async fn delete_test_stack(
        &self,
        session: &UpstreamSession,
        project_id: &str,
        body: Value,
    ) -> Result<ServiceResponse, ApplicationError> {
        let builder = self
            .request(Method::POST, session, &["test-stack", project_id])
            .json(&body);
        Self::send(builder).await
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn project_details(
        &self,
        session: &UpstreamSession,
        project_id: &str,
    ) -> Result<ServiceResponse, ApplicationError> {
        Self::send(self.request(Method::GET, session, &["project", project_id])).await
    }
}
