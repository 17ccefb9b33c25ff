//! Request context for propagating the verified session and request metadata
//!
//! The HTTP auth middleware builds a `RequestContext` from the verified app
//! token and hands it to services that act on behalf of a user.
//!
//! # Examples
//!
//! ```
//! use application::RequestContext;
//! use domain::{Region, SessionClaims, UserId};
//!
//! let claims = SessionClaims::new(Region::Na, UserId::parse("blt1").unwrap());
//! let ctx = RequestContext::new(claims);
//!
//! assert_eq!(ctx.user_id().as_str(), "blt1");
//! assert!(ctx.request_id().is_none());
//! ```

use chrono::{DateTime, Utc};
use domain::{Region, SessionClaims, UserId};

/// Context for a single authenticated request
#[derive(Debug, Clone)]
pub struct RequestContext {
    claims: SessionClaims,
    request_id: Option<String>,
    timestamp: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context for the given session, stamped with the current time
    #[must_use]
    pub fn new(claims: SessionClaims) -> Self {
        Self {
            claims,
            request_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the correlation id of the inbound request
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub const fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.claims.user_id
    }

    #[must_use]
    pub const fn region(&self) -> Region {
        self.claims.region
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// When the request was received
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
