//! Generation HTTP Handlers - 构成、标题、执笔、四件套、WordPress 转换

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{
    ConvertToWordpress, EditOutlinePart, EditWritingPart, GenerateFinishing, GenerateOutline,
    GenerateTitles, GenerateWriting, TitlesGenerated,
};
use crate::infrastructure::http::dto::{
    ApiJson, ContentResponse, ConvertToWordpressRequest, EditStructurePartRequest,
    EditWritingPartRequest, EditedTextResponse, FinishingRequest, FinishingResponse,
    GenerateStructureRequest, GenerateTitlesRequest, GenerateWritingRequest, HtmlResponse,
    StructureResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 生成记事构成
///
/// POST /api/generate-structure
pub async fn generate_structure(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GenerateStructureRequest>,
) -> Result<Json<StructureResponse>, ApiError> {
    let cmd = GenerateOutline::try_from(req)?;
    let result = state.generate_outline_handler.handle(cmd).await?;

    Ok(Json(StructureResponse {
        structure: result.structure,
        outline_change: result.change,
    }))
}

/// 构成局部编辑
///
/// POST /api/edit-structure-part
pub async fn edit_structure_part(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EditStructurePartRequest>,
) -> Result<Json<EditedTextResponse>, ApiError> {
    let edited_text = state
        .edit_outline_part_handler
        .handle(EditOutlinePart::from(req))
        .await?;
    Ok(Json(EditedTextResponse { edited_text }))
}

/// 标题候选
///
/// POST /api/generate-titles
pub async fn generate_titles(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GenerateTitlesRequest>,
) -> Result<Json<TitlesGenerated>, ApiError> {
    let titles = state
        .generate_titles_handler
        .handle(GenerateTitles::from(req))
        .await?;
    Ok(Json(titles))
}

/// 执笔单个 H2
///
/// POST /api/generate-writing
pub async fn generate_writing(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GenerateWritingRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    let cmd = GenerateWriting::try_from(req)?;
    let content = state.generate_writing_handler.handle(cmd).await?;
    Ok(Json(ContentResponse { content }))
}

/// 正文局部编辑
///
/// POST /api/edit-writing-part
pub async fn edit_writing_part(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<EditWritingPartRequest>,
) -> Result<Json<EditedTextResponse>, ApiError> {
    let edited_text = state
        .edit_writing_part_handler
        .handle(EditWritingPart::from(req))
        .await?;
    Ok(Json(EditedTextResponse { edited_text }))
}

/// 导语 / 销售文 / まとめ / 摘要
///
/// POST /api/generate-intro-sales-summary-desc
pub async fn generate_finishing(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<FinishingRequest>,
) -> Result<Json<FinishingResponse>, ApiError> {
    let cmd = GenerateFinishing::try_from(req)?;
    let result = state.generate_finishing_handler.handle(cmd).await?;

    Ok(Json(FinishingResponse {
        bundle: result.bundle,
        report: result.report,
    }))
}

/// POST /api/convert-to-wordpress
pub async fn convert_to_wordpress(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ConvertToWordpressRequest>,
) -> Result<Json<HtmlResponse>, ApiError> {
    let cmd = ConvertToWordpress::try_from(req)?;
    let html = state.convert_to_wordpress_handler.handle(cmd).await?;
    Ok(Json(HtmlResponse { html }))
}
