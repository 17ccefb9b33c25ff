//! Port for the external migration service

use async_trait::async_trait;
use domain::{Region, UserId};
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use super::ServiceResponse;
use crate::error::ApplicationError;

/// Identity forwarded with every migration call
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamSession {
    pub authtoken: String,
    pub region: Region,
    pub user_id: UserId,
    /// Correlation id of the inbound request, forwarded as `X-Request-Id`
    pub request_id: Option<String>,
}

impl std::fmt::Debug for UpstreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSession")
            .field("region", &self.region)
            .field("user_id", &self.user_id)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl UpstreamSession {
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(ToOwned::to_owned);
        self
    }
}

/// Entry points of the migration engine
///
/// The engine owns all migration logic; this gateway only forwards calls
/// and relays the `(status, data)` it answers with.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MigrationPort: Send + Sync {
    /// Run the field-mapping step against a test stack
    async fn field_mapping(
        &self,
        session: &UpstreamSession,
        org_id: &str,
        project_id: &str,
        body: Value,
    ) -> Result<ServiceResponse, ApplicationError>;

    /// Delete the test stack of a project
    async fn delete_test_stack(
        &self,
        session: &UpstreamSession,
        project_id: &str,
        body: Value,
    ) -> Result<ServiceResponse, ApplicationError>;

    /// Full project detail
    async fn project_details(
        &self,
        session: &UpstreamSession,
        project_id: &str,
    ) -> Result<ServiceResponse, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_authtoken() {
        let session = UpstreamSession {
            authtoken: "cs-secret".into(),
            region: Region::Na,
            user_id: UserId::parse("blt1").unwrap(),
            request_id: None,
        };
        assert!(!format!("{session:?}").contains("cs-secret"));
    }
}
