//! Project operations forwarded to the migration service

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    error::ApplicationError,
    ports::{MigrationPort, ServiceResponse, UpstreamSession},
    request_context::RequestContext,
    services::session_store::{SessionStore, StoredSession},
};

/// Relays project calls with the caller's CMS session attached
pub struct ProjectService {
    migration: Arc<dyn MigrationPort>,
    sessions: SessionStore,
}

impl fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectService").finish_non_exhaustive()
    }
}

impl ProjectService {
    pub fn new(migration: Arc<dyn MigrationPort>, sessions: SessionStore) -> Self {
        Self {
            migration,
            sessions,
        }
    }

    fn upstream(session: &StoredSession, ctx: &RequestContext) -> UpstreamSession {
        session.upstream().with_request_id(ctx.request_id())
    }

    #[instrument(skip(self, ctx, body), fields(user_id = %ctx.user_id()))]
    pub async fn field_mapping(
        &self,
        ctx: &RequestContext,
        org_id: &str,
        project_id: &str,
        body: Value,
    ) -> Result<ServiceResponse, ApplicationError> {
        let session = self.sessions.load(ctx.claims()).await?;
        info!("Running field mapping on test stack");
        self.migration
            .field_mapping(&Self::upstream(&session, ctx), org_id, project_id, body)
            .await
    }

    #[instrument(skip(self, ctx, body), fields(user_id = %ctx.user_id()))]
    pub async fn delete_test_stack(
        &self,
        ctx: &RequestContext,
        project_id: &str,
        body: Value,
    ) -> Result<ServiceResponse, ApplicationError> {
        let session = self.sessions.load(ctx.claims()).await?;
        info!("Deleting test stack");
        self.migration
            .delete_test_stack(&Self::upstream(&session, ctx), project_id, body)
            .await
    }

    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id()))]
    pub async fn project_details(
        &self,
        ctx: &RequestContext,
        project_id: &str,
    ) -> Result<ServiceResponse, ApplicationError> {
        let session = self.sessions.load(ctx.claims()).await?;
        self.migration
            .project_details(&Self::upstream(&session, ctx), project_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use domain::{Region, SessionClaims, UserId};
    use serde_json::json;

    use super::*;
    use crate::ports::{MockKeyValueStorePort, MockMigrationPort};

    fn ctx() -> RequestContext {
        RequestContext::new(SessionClaims::new(
            Region::AzureNa,
            UserId::parse("blt8").unwrap(),
        ))
        .with_request_id("req-42")
    }

    fn stored() -> MockKeyValueStorePort {
        let mut kv = MockKeyValueStorePort::new();
        kv.expect_get().returning(|_, _| {
            Ok(Some(json!({
                "user_id": "blt8",
                "region": "AZURE_NA",
                "authtoken": "cs-8",
                "updated_at": "2026-01-01T00:00:00Z"
            })))
        });
        kv
    }

    #[tokio::test]
    async fn field_mapping_forwards_session_and_ids() {
        let mut migration = MockMigrationPort::new();
        migration
            .expect_field_mapping()
            .withf(|session, org, project, body| {
                session.authtoken == "cs-8"
                    && session.region == Region::AzureNa
                    && session.request_id.as_deref() == Some("req-42")
                    && org == "org1"
                    && project == "p1"
                    && body["stack"] == "s1"
            })
            .returning(|_, _, _, _| Ok(ServiceResponse::ok(json!({"status": "mapped"}))));

        let sessions = SessionStore::new(Arc::new(stored()));
        let service = ProjectService::new(Arc::new(migration), sessions);
        let response = service
            .field_mapping(&ctx(), "org1", "p1", json!({"stack": "s1"}))
            .await
            .unwrap();
        assert_eq!(response.data["status"], "mapped");
    }

    #[tokio::test]
    async fn upstream_status_is_relayed_verbatim() {
        let mut migration = MockMigrationPort::new();
        migration
            .expect_project_details()
            .returning(|_, _| {
                Ok(ServiceResponse::new(
                    404,
                    json!({"message": "Project not found"}),
                ))
            });

        let sessions = SessionStore::new(Arc::new(stored()));
        let service = ProjectService::new(Arc::new(migration), sessions);
        let response = service.project_details(&ctx(), "missing").await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.data["message"], "Project not found");
    }

    #[tokio::test]
    async fn delete_test_stack_forwards() {
        let mut migration = MockMigrationPort::new();
        migration
            .expect_delete_test_stack()
            .withf(|_, project, _| project == "p2")
            .times(1)
            .returning(|_, _, _| Ok(ServiceResponse::ok(json!({"deleted": true}))));

        let sessions = SessionStore::new(Arc::new(stored()));
        let service = ProjectService::new(Arc::new(migration), sessions);
        let response = service
            .delete_test_stack(&ctx(), "p2", Value::Null)
            .await
            .unwrap();
        assert_eq!(response.data["deleted"], true);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mut migration = MockMigrationPort::new();
        migration
            .expect_project_details()
            .returning(|_, _| Err(ApplicationError::Upstream("connection refused".into())));

        let sessions = SessionStore::new(Arc::new(stored()));
        let service = ProjectService::new(Arc::new(migration), sessions);
        let err = service.project_details(&ctx(), "p1").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
