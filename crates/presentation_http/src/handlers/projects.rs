//! Project routes forwarded to the migration service

use std::sync::LazyLock;

use application::RequestContext;
use axum::{Extension, body::Bytes, extract::State, response::Response};
use domain::{Constraint, FieldRule, ValidationSchema};
use serde::Deserialize;

use super::relay;
use crate::{
    error::ApiError,
    middleware::{RequestSchema, ValidatedPath, validation::parse_body},
    state::AppState,
};

fn id_rule(name: &str) -> FieldRule {
    FieldRule::params(name)
        .with(Constraint::Required)
        .with(Constraint::String)
        .with(Constraint::NonEmpty)
}

/// `/test-stack/{orgId}/{projectId}`
#[derive(Debug, Clone, Deserialize)]
pub struct OrgProjectPath {
    #[serde(rename = "orgId")]
    pub org_id: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
}

impl RequestSchema for OrgProjectPath {
    fn schema() -> &'static ValidationSchema {
        static SCHEMA: LazyLock<ValidationSchema> = LazyLock::new(|| {
            ValidationSchema::new()
                .rule(id_rule("orgId"))
                .rule(id_rule("projectId"))
        });
        &SCHEMA
    }
}

/// Any route addressed by `{projectId}` alone
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPath {
    #[serde(rename = "projectId")]
    pub project_id: String,
}

impl RequestSchema for ProjectPath {
    fn schema() -> &'static ValidationSchema {
        static SCHEMA: LazyLock<ValidationSchema> =
            LazyLock::new(|| ValidationSchema::new().rule(id_rule("projectId")));
        &SCHEMA
    }
}

/// Run the field-mapping step against the project's test stack
pub async fn field_mapping(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ValidatedPath(path): ValidatedPath<OrgProjectPath>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = parse_body(&body)?;
    let response = state
        .project_service
        .field_mapping(&ctx, &path.org_id, &path.project_id, body)
        .await?;
    Ok(relay(response))
}

/// Delete the project's test stack
pub async fn delete_test_stack(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ValidatedPath(path): ValidatedPath<ProjectPath>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = parse_body(&body)?;
    let response = state
        .project_service
        .delete_test_stack(&ctx, &path.project_id, body)
        .await?;
    Ok(relay(response))
}

/// Full project detail
pub async fn project_details(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ValidatedPath(path): ValidatedPath<ProjectPath>,
) -> Result<Response, ApiError> {
    let response = state
        .project_service
        .project_details(&ctx, &path.project_id)
        .await?;
    Ok(relay(response))
}
