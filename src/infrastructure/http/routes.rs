//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                               GET   健康检查
//! - /api/login                              POST  登录（签发 Cookie）
//! - /api/check-auth                         GET   登录状态
//! - /api/generate-structure                 POST  生成记事构成
//! - /api/edit-structure-part                POST  构成局部编辑
//! - /api/generate-titles                    POST  标题候选
//! - /api/generate-writing                   POST  执笔单个 H2
//! - /api/edit-writing-part                  POST  正文局部编辑
//! - /api/generate-internal-links            POST  插入内部链接
//! - /api/generate-sales-locations           POST  标记销售位置
//! - /api/generate-supervisor-comments       POST  插入监修者评论
//! - /api/generate-intro-sales-summary-desc  POST  导语 / 销售文 / まとめ / 摘要
//! - /api/convert-to-wordpress               POST  转换为 WordPress HTML
//! - /api/tasks                              POST  统一任务入口
//! - /api/catalog                            GET   内部链接候选目录
//! - /api/articles/list                      GET   文章列表
//! - /api/articles/{get,save,autosave,delete,outline,resolve-conflict}  POST

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/login", post(handlers::login))
        .route("/check-auth", get(handlers::check_auth))
        .merge(generation_routes())
        .route("/tasks", post(handlers::run_task))
        .route("/catalog", get(handlers::get_catalog))
        .nest("/articles", article_routes())
}

/// 生成类路由
fn generation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-structure", post(handlers::generate_structure))
        .route("/edit-structure-part", post(handlers::edit_structure_part))
        .route("/generate-titles", post(handlers::generate_titles))
        .route("/generate-writing", post(handlers::generate_writing))
        .route("/edit-writing-part", post(handlers::edit_writing_part))
        .route(
            "/generate-internal-links",
            post(handlers::generate_internal_links),
        )
        .route(
            "/generate-sales-locations",
            post(handlers::generate_sales_locations),
        )
        .route(
            "/generate-supervisor-comments",
            post(handlers::generate_supervisor_comments),
        )
        .route(
            "/generate-intro-sales-summary-desc",
            post(handlers::generate_finishing),
        )
        .route("/convert-to-wordpress", post(handlers::convert_to_wordpress))
}

/// Article 路由
fn article_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_articles))
        .route("/get", post(handlers::get_article))
        .route("/save", post(handlers::save_article))
        .route("/autosave", post(handlers::autosave_article))
        .route("/delete", post(handlers::delete_article))
        .route("/outline", post(handlers::apply_outline))
        .route("/resolve-conflict", post(handlers::resolve_conflict))
}
