//! Profile of the signed-in user

use application::RequestContext;
use axum::{Extension, extract::State, response::Response};

use super::relay;
use crate::{error::ApiError, state::AppState};

/// CMS profile, including organisation roles
pub async fn profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, ApiError> {
    let response = state.user_service.profile(&ctx).await?;
    Ok(relay(response))
}
