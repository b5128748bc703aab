//! Unified Task Endpoint
//!
//! `POST /api/tasks` 按 `task` 字段分发到各个具体接口

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{generation, mutation};
use crate::infrastructure::http::dto::{ApiJson, TaskRequest};
use crate::infrastructure::http::state::AppState;

/// POST /api/tasks
pub async fn run_task(
    State(state): State<Arc<AppState>>,
    ApiJson(task): ApiJson<TaskRequest>,
) -> Response {
    let state = State(state);
    match task {
        TaskRequest::Outline(req) => generation::generate_structure(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::OutlinePartEdit(req) => generation::edit_structure_part(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::Titles(req) => generation::generate_titles(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::Writing(req) => generation::generate_writing(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::WritingPartEdit(req) => generation::edit_writing_part(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::InternalLinks(req) => mutation::generate_internal_links(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::SalesLocations(req) => {
            mutation::generate_sales_locations(state, ApiJson(req))
                .await
                .into_response()
        }
        TaskRequest::SupervisorComments(req) => {
            mutation::generate_supervisor_comments(state, ApiJson(req))
                .await
                .into_response()
        }
        TaskRequest::Finishing(req) => generation::generate_finishing(state, ApiJson(req))
            .await
            .into_response(),
        TaskRequest::WordpressHtml(req) => generation::convert_to_wordpress(state, ApiJson(req))
            .await
            .into_response(),
    }
}
