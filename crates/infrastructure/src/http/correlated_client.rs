//! HTTP client with request ID correlation
//!
//! Wraps `reqwest::Client` so adapters can attach the inbound request's
//! `X-Request-Id` to outgoing calls.
//!
//! # Examples
//!
//! ```ignore
//! use infrastructure::http::CorrelatedHttpClient;
//!
//! let client = CorrelatedHttpClient::new()?;
//! let response = client
//!     .get("https://api.example.com/v3/user")
//!     .with_request_id(&session)
//!     .send()
//!     .await?;
//! ```

use std::time::Duration;

use application::{RequestContext, UpstreamSession};
use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{HeaderName, HeaderValue},
};
use tracing::{debug, instrument};

use crate::config::UpstreamConfig;

/// Header name for request correlation ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Types that may carry the correlation id of an inbound request
pub trait RequestIdProvider {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdProvider for str {
    fn request_id(&self) -> Option<&str> {
        Some(self)
    }
}

impl RequestIdProvider for String {
    fn request_id(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: RequestIdProvider> RequestIdProvider for Option<T> {
    fn request_id(&self) -> Option<&str> {
        self.as_ref().and_then(RequestIdProvider::request_id)
    }
}

impl RequestIdProvider for RequestContext {
    fn request_id(&self) -> Option<&str> {
        Self::request_id(self)
    }
}

impl RequestIdProvider for UpstreamSession {
    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Configuration for the correlated HTTP client
#[derive(Debug, Clone)]
pub struct CorrelatedClientConfig {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CorrelatedClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("migration-gateway/{}", env!("CARGO_PKG_VERSION"))
}

impl From<&UpstreamConfig> for CorrelatedClientConfig {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            timeout: config.timeout(),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        }
    }
}

impl CorrelatedClientConfig {
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client that propagates request correlation IDs
#[derive(Debug, Clone)]
pub struct CorrelatedHttpClient {
    inner: Client,
    config: CorrelatedClientConfig,
}

impl CorrelatedHttpClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(CorrelatedClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn with_config(config: CorrelatedClientConfig) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { inner, config })
    }

    #[must_use]
    pub const fn config(&self) -> &CorrelatedClientConfig {
        &self.config
    }

    pub fn get(&self, url: impl AsRef<str>) -> CorrelatedRequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl AsRef<str>) -> CorrelatedRequestBuilder {
        self.request(Method::POST, url)
    }

    /// Start a request with a specific method
    pub fn request(&self, method: Method, url: impl AsRef<str>) -> CorrelatedRequestBuilder {
        CorrelatedRequestBuilder::new(self.inner.request(method, url.as_ref()))
    }
}

/// A request builder that supports correlation ID attachment
pub struct CorrelatedRequestBuilder {
    inner: RequestBuilder,
    request_id: Option<String>,
}

impl std::fmt::Debug for CorrelatedRequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelatedRequestBuilder")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl CorrelatedRequestBuilder {
    #[allow(clippy::missing_const_for_fn)]
    fn new(inner: RequestBuilder) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    /// Attach the correlation id of `source`, if it has one
    #[must_use]
    pub fn with_request_id(mut self, source: &(impl RequestIdProvider + ?Sized)) -> Self {
        self.request_id = source.request_id().map(ToOwned::to_owned);
        self
    }

    /// Add a header; names or values that are not valid header text are skipped
    #[must_use]
    pub fn header(
        mut self,
        name: impl TryInto<HeaderName>,
        value: impl TryInto<HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.inner = self.inner.header(name, value);
        }
        self
    }

    #[must_use]
    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.inner = self.inner.json(json);
        self
    }

    #[must_use]
    pub fn query<T: serde::Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.inner = self.inner.query(query);
        self
    }

    /// Send the request
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(request_id = ?self.request_id))]
    pub async fn send(self) -> Result<Response, reqwest::Error> {
        let mut builder = self.inner;

        if let Some(request_id) = self.request_id {
            debug!(request_id = %request_id, "Sending correlated HTTP request");
            builder = builder.header(X_REQUEST_ID, request_id);
        }

        builder.send().await
    }
}
