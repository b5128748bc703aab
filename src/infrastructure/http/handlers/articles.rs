//! Article Store HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{
    ApplyOutline, AutosaveArticle, DeleteArticle, GetArticle, ListArticles, ResolveConflict,
    SaveArticle,
};
use crate::domain::{Article, ArticleSummary};
use crate::infrastructure::http::dto::{
    ApiJson, ApplyOutlineRequest, ApplyOutlineResponse, ArticleIdRequest, AutosaveResponse,
    ResolveConflictRequest, SaveArticleRequest, SuccessResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出所有文章（按保存时间倒序）
///
/// GET /api/articles/list
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let summaries = state.list_articles_handler.handle(ListArticles).await?;
    Ok(Json(summaries))
}

/// POST /api/articles/get
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ArticleIdRequest>,
) -> Result<Json<Article>, ApiError> {
    let id = req.article_id()?;
    let article = state.get_article_handler.handle(GetArticle { id }).await?;
    Ok(Json(article))
}

/// 立即保存
///
/// POST /api/articles/save
pub async fn save_article(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SaveArticleRequest>,
) -> Result<Json<Article>, ApiError> {
    let article = state
        .save_article_handler
        .handle(SaveArticle {
            article: req.article,
        })
        .await?;
    Ok(Json(article))
}

/// 延迟保存，立即返回
///
/// POST /api/articles/autosave
pub async fn autosave_article(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SaveArticleRequest>,
) -> Json<AutosaveResponse> {
    let id = state.autosave_article_handler.handle(AutosaveArticle {
        article: req.article,
    });
    Json(AutosaveResponse {
        id,
        scheduled: true,
    })
}

/// POST /api/articles/delete
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ArticleIdRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = req.article_id()?;
    state.delete_article_handler.handle(DeleteArticle { id }).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// 替换大纲并重新解析段落
///
/// POST /api/articles/outline
pub async fn apply_outline(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ApplyOutlineRequest>,
) -> Result<Json<ApplyOutlineResponse>, ApiError> {
    let article_id = ArticleIdRequest { id: req.article_id }.article_id()?;
    let (article, change) = state
        .apply_outline_handler
        .handle(ApplyOutline {
            article_id,
            outline: req.outline,
        })
        .await?;
    Ok(Json(ApplyOutlineResponse { article, change }))
}

/// POST /api/articles/resolve-conflict
pub async fn resolve_conflict(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResolveConflictRequest>,
) -> Result<Json<Article>, ApiError> {
    let (article_id, conflict_id, resolution) = req.parts()?;
    let article = state
        .resolve_conflict_handler
        .handle(ResolveConflict {
            article_id,
            conflict_id,
            resolution,
        })
        .await?;
    Ok(Json(article))
}
