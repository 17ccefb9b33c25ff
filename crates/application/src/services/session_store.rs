//! Stored CMS sessions keyed by user id
//!
//! Login keeps the CMS authtoken server-side; the app token only carries
//! `{region, user_id}`, and later requests look the authtoken up here.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use domain::{Region, SessionClaims, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{KeyValueStoreExt, KeyValueStorePort, UpstreamSession},
};

/// Collection holding one document per signed-in user
pub const USERS_COLLECTION: &str = "users";

/// CMS session of a signed-in user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user_id: UserId,
    pub region: Region,
    pub authtoken: String,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("user_id", &self.user_id)
            .field("region", &self.region)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

impl StoredSession {
    pub fn new(claims: &SessionClaims, authtoken: impl Into<String>) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            region: claims.region,
            authtoken: authtoken.into(),
            updated_at: Utc::now(),
        }
    }

    /// Identity to forward upstream
    pub fn upstream(&self) -> UpstreamSession {
        UpstreamSession {
            authtoken: self.authtoken.clone(),
            region: self.region,
            user_id: self.user_id.clone(),
            request_id: None,
        }
    }
}

/// Typed access to the `users` collection
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStorePort>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStorePort>) -> Self {
        Self { store }
    }

    /// Insert or replace the session of a user
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn save(&self, session: &StoredSession) -> Result<(), ApplicationError> {
        self.store
            .put_as(USERS_COLLECTION, session.user_id.as_str(), session)
            .await?;
        debug!("Stored CMS session");
        Ok(())
    }

    /// Load the session for the given claims
    ///
    /// Fails with `Unauthorized` when there is none, which happens after the
    /// store was wiped or the user never logged in through this gateway.
    #[instrument(skip(self), fields(user_id = %claims.user_id))]
    pub async fn load(&self, claims: &SessionClaims) -> Result<StoredSession, ApplicationError> {
        self.store
            .get_as::<StoredSession>(USERS_COLLECTION, claims.user_id.as_str())
            .await?
            .ok_or_else(|| {
                ApplicationError::Unauthorized("No active session, please log in again".into())
            })
    }

    /// Drop the session of a user
    pub async fn remove(&self, user_id: &UserId) -> Result<bool, ApplicationError> {
        self.store.remove(USERS_COLLECTION, user_id.as_str()).await
    }
}
