//! Health check handler

use std::collections::BTreeMap;

use application::ServiceHealth;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: BTreeMap<String, ServiceHealth>,
}

/// Liveness plus local dependency status
///
/// Answers 503 while the session store or the request log is unusable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = state.health_service.check_all().await;

    let (status_code, status) = if report.healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: report.services,
        }),
    )
}
