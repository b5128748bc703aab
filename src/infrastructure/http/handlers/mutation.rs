//! Mutation HTTP Handlers
//!
//! 每次调用最多处理 `pipeline.max_sections_per_request` 个段落，
//! 客户端根据 `remaining` 继续调用直到为 0。

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{MutationResponse, RunMutation};
use crate::infrastructure::http::dto::{
    ApiJson, InternalLinksRequest, SalesLocationsRequest, SupervisorCommentsRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

async fn run(state: &AppState, cmd: RunMutation) -> Result<Json<MutationResponse>, ApiError> {
    let response = state.run_mutation_handler.handle(cmd).await?;
    Ok(Json(response))
}

/// POST /api/generate-internal-links
pub async fn generate_internal_links(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<InternalLinksRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    run(&state, RunMutation::try_from(req)?).await
}

/// POST /api/generate-sales-locations
pub async fn generate_sales_locations(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SalesLocationsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    run(&state, RunMutation::try_from(req)?).await
}

/// POST /api/generate-supervisor-comments
pub async fn generate_supervisor_comments(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SupervisorCommentsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    run(&state, RunMutation::try_from(req)?).await
}
