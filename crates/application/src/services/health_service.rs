//! Health aggregation service
//!
//! Checks the local dependencies the gateway cannot serve without (the
//! session store and the request log) with a per-check timeout.

use std::{collections::BTreeMap, future::Future, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, timeout};
use tracing::{debug, instrument, warn};

use crate::ports::{KeyValueStorePort, LogSinkPort};

/// Default timeout for a single health check in seconds
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Status of an individual dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub healthy: bool,
    /// Response time in milliseconds (if the check completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            healthy: true,
            response_time_ms: None,
            error: None,
        }
    }

    #[must_use]
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            response_time_ms: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::unhealthy("Health check timed out")
    }

    #[must_use]
    pub const fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }
}

/// Health of every checked dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// True if all dependencies are healthy
    pub healthy: bool,
    pub services: BTreeMap<String, ServiceHealth>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    #[must_use]
    pub fn new(services: BTreeMap<String, ServiceHealth>) -> Self {
        let healthy = services.values().all(|s| s.healthy);
        Self {
            healthy,
            services,
            checked_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn service_status(&self, name: &str) -> Option<&ServiceHealth> {
        self.services.get(name)
    }
}

pub struct HealthService {
    store: Arc<dyn KeyValueStorePort>,
    log_sink: Arc<dyn LogSinkPort>,
    timeout: Duration,
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HealthService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStorePort>, log_sink: Arc<dyn LogSinkPort>) -> Self {
        Self {
            store,
            log_sink,
            timeout: Duration::from_secs(DEFAULT_HEALTH_CHECK_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check all dependencies
    #[instrument(skip(self))]
    pub async fn check_all(&self) -> HealthReport {
        let (storage, log_sink) = tokio::join!(
            self.check("storage", self.store.is_healthy()),
            self.check("log_sink", self.log_sink.is_healthy()),
        );

        let mut services = BTreeMap::new();
        services.insert("storage".to_string(), storage);
        services.insert("log_sink".to_string(), log_sink);
        HealthReport::new(services)
    }

    async fn check(&self, name: &str, ping: impl Future<Output = bool> + Send) -> ServiceHealth {
        let start = Instant::now();
        match timeout(self.timeout, ping).await {
            Ok(healthy) => {
                let response_time = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if healthy {
                    debug!(service = name, response_time_ms = response_time, "Healthy");
                    ServiceHealth::healthy().with_response_time(response_time)
                } else {
                    warn!(service = name, response_time_ms = response_time, "Unhealthy");
                    ServiceHealth::unhealthy(format!("{name} unavailable"))
                        .with_response_time(response_time)
                }
            },
            Err(_) => {
                warn!(service = name, "Health check timed out");
                ServiceHealth::timeout()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockKeyValueStorePort, MockLogSinkPort};

    fn service(store_ok: bool, sink_ok: bool) -> HealthService {
        let mut store = MockKeyValueStorePort::new();
        store.expect_is_healthy().returning(move || store_ok);
        let mut sink = MockLogSinkPort::new();
        sink.expect_is_healthy().returning(move || sink_ok);
        HealthService::new(Arc::new(store), Arc::new(sink))
    }

    #[tokio::test]
    async fn all_healthy() {
        let report = service(true, true).check_all().await;
        assert!(report.healthy);
        assert!(report.service_status("storage").unwrap().healthy);
        assert!(report.service_status("log_sink").unwrap().response_time_ms.is_some());
    }

    #[tokio::test]
    async fn one_unhealthy_dependency_fails_report() {
        let report = service(true, false).check_all().await;
        assert!(!report.healthy);
        let sink = report.service_status("log_sink").unwrap();
        assert_eq!(sink.error.as_deref(), Some("log_sink unavailable"));
    }

    #[test]
    fn timeout_status() {
        let status = ServiceHealth::timeout();
        assert!(!status.healthy);
        assert_eq!(status.error.as_deref(), Some("Health check timed out"));
    }
}
