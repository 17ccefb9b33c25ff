//! Profile of the signed-in user

use std::{fmt, sync::Arc};

use tracing::instrument;

use crate::{
    error::ApplicationError,
    ports::{IdentityProviderPort, ServiceResponse},
    request_context::RequestContext,
    services::session_store::SessionStore,
};

pub struct UserService {
    identity: Arc<dyn IdentityProviderPort>,
    sessions: SessionStore,
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(identity: Arc<dyn IdentityProviderPort>, sessions: SessionStore) -> Self {
        Self { identity, sessions }
    }

    /// Fetch the caller's CMS profile using their stored authtoken
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id()))]
    pub async fn profile(&self, ctx: &RequestContext) -> Result<ServiceResponse, ApplicationError> {
        let session = self.sessions.load(ctx.claims()).await?;
        let upstream = session.upstream().with_request_id(ctx.request_id());
        self.identity.user_profile(&upstream).await
    }
}

#[cfg(test)]
mod tests {
    use domain::{Region, SessionClaims, UserId};
    use serde_json::json;

    use super::*;
    use crate::ports::{MockIdentityProviderPort, MockKeyValueStorePort};

    fn ctx() -> RequestContext {
        RequestContext::new(SessionClaims::new(
            Region::Eu,
            UserId::parse("blt5").unwrap(),
        ))
        .with_request_id("req-profile")
    }

    #[tokio::test]
    async fn profile_uses_stored_authtoken() {
        let mut kv = MockKeyValueStorePort::new();
        kv.expect_get().returning(|_, _| {
            Ok(Some(json!({
                "user_id": "blt5",
                "region": "EU",
                "authtoken": "cs-5",
                "updated_at": "2026-01-01T00:00:00Z"
            })))
        });

        let mut identity = MockIdentityProviderPort::new();
        identity
            .expect_user_profile()
            .withf(|session| {
                session.region == Region::Eu
                    && session.authtoken == "cs-5"
                    && session.request_id.as_deref() == Some("req-profile")
            })
            .returning(|_| Ok(ServiceResponse::ok(json!({"user": {"uid": "blt5"}}))));

        let service = UserService::new(Arc::new(identity), SessionStore::new(Arc::new(kv)));
        let response = service.profile(&ctx()).await.unwrap();
        assert_eq!(response.data["user"]["uid"], "blt5");
    }

    #[tokio::test]
    async fn profile_without_session_is_unauthorized() {
        let mut kv = MockKeyValueStorePort::new();
        kv.expect_get().returning(|_, _| Ok(None));
        let mut identity = MockIdentityProviderPort::new();
        identity.expect_user_profile().never();

        let service = UserService::new(Arc::new(identity), SessionStore::new(Arc::new(kv)));
        let err = service.profile(&ctx()).await.unwrap_err();
        assert!(err.is_auth());
    }
}
