//! Catalog HTTP Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{Catalog, GetCatalog};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 内部链接候选目录
///
/// GET /api/catalog
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Result<Json<Catalog>, ApiError> {
    let catalog = state.get_catalog_handler.handle(GetCatalog).await?;
    Ok(Json(catalog))
}
