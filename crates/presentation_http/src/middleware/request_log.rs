//! Request logging middleware
//!
//! Wraps the whole chain and produces exactly one [`LogEntry`] per
//! request/response pair. The entry is redacted before it leaves this module,
//! emitted through `tracing` and appended to the request log.

use std::{
    collections::BTreeMap,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};

use application::LogService;
use axum::{
    body::Body,
    extract::{MatchedPath, Query, Request},
    http::HeaderMap,
    response::Response,
};
use domain::{LogEntry, LogLevel};
use serde_json::{Map, Value, json};
use tower::{Layer, Service};
use tracing::{error, info, warn};

use crate::{
    error::ErrorDetail,
    middleware::{AuthenticatedUser, RequestId},
};

/// Layer that records every request
#[derive(Clone)]
pub struct RequestLogLayer {
    logs: Arc<LogService>,
}

impl fmt::Debug for RequestLogLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogLayer").finish_non_exhaustive()
    }
}

impl RequestLogLayer {
    pub fn new(logs: Arc<LogService>) -> Self {
        Self { logs }
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLog {
            inner,
            logs: Arc::clone(&self.logs),
        }
    }
}

#[derive(Clone)]
pub struct RequestLog<S> {
    inner: S,
    logs: Arc<LogService>,
}

impl<S: fmt::Debug> fmt::Debug for RequestLog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLog")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// What is known about a request before it runs
struct RequestSummary {
    method: String,
    path: String,
    route: String,
    query: Value,
    headers: Value,
    request_id: Option<String>,
}

impl RequestSummary {
    fn capture(req: &Request<Body>) -> Self {
        let path = req.uri().path().to_string();
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map_or_else(|| path.clone(), |m| m.as_str().to_string());
        let query = Query::<BTreeMap<String, String>>::try_from_uri(req.uri())
            .map(|Query(params)| json!(params))
            .unwrap_or(Value::Null);

        Self {
            method: req.method().to_string(),
            path,
            route,
            query,
            headers: headers_json(req.headers()),
            request_id: req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.as_str().to_string()),
        }
    }

    fn into_entry(self, response: &Response, latency_ms: u64) -> LogEntry {
        let status = response.status().as_u16();
        let error = response.extensions().get::<ErrorDetail>();
        let user = response.extensions().get::<AuthenticatedUser>();

        let level = LogLevel::for_status(status, error.is_some());
        let mut entry = LogEntry::new(
            level,
            format!("{} {} {status}", self.method, self.path),
            format!("{} {}", self.method, self.route),
        )
        .with_meta(json!({
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "status": status,
            "latency_ms": latency_ms,
            "request_id": self.request_id,
            "headers": self.headers,
        }));

        if let Some(AuthenticatedUser(user)) = user {
            entry = entry.with_user(user.clone());
        }
        if let Some(detail) = error {
            entry = entry.with_error(format!("{}: {}", detail.code, detail.message));
        }
        entry
    }
}

/// Header map as a JSON object; repeated headers are joined with `, `
fn headers_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap_or("<binary>"))
            .collect::<Vec<_>>()
            .join(", ");
        map.insert(name.as_str().to_string(), Value::String(joined));
    }
    Value::Object(map)
}

fn emit(entry: &LogEntry) {
    let user = entry.user.as_deref().unwrap_or("-");
    let error = entry.error.as_deref().unwrap_or("-");
    let meta = entry.meta();
    match entry.level {
        LogLevel::Error => {
            error!(method = %entry.method_name, user, error, meta = %meta, "{}", entry.message);
        },
        LogLevel::Warn => {
            warn!(method = %entry.method_name, user, error, meta = %meta, "{}", entry.message);
        },
        LogLevel::Info | LogLevel::Debug => {
            info!(method = %entry.method_name, user, meta = %meta, "{}", entry.message);
        },
    }
}

impl<S> Service<Request<Body>> for RequestLog<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let logs = Arc::clone(&self.logs);
        let summary = RequestSummary::capture(&req);
        let started = Instant::now();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;

            let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            let entry = summary.into_entry(&response, latency_ms);
            emit(&entry);
            logs.record(&entry).await;

            Ok(response)
        })
    }
}
