//! Search over the stored request log

use application::LogPage;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

/// `?search_text=&skip=&limit=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Newest entries first; an empty or `null` search matches everything
pub async fn search_logs(
    State(state): State<AppState>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<LogPage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let page = state
        .log_service
        .search(
            query.search_text.as_deref(),
            query.skip.unwrap_or_default(),
            query.limit,
        )
        .await?;
    Ok(Json(page))
}
