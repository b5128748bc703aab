//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth::password_gate;
use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 前端构建产物目录，`None` 时只提供 API
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .expose_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        let mut router = create_routes();
        if let Some(dir) = &self.config.static_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        // 附件以 base64 内联在请求体中，限制放宽到 50MB
        router
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                password_gate,
            ))
            .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器
    pub async fn run(self) -> Result<(), std::io::Error> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use std::time::Duration;
    use tower::util::ServiceExt;

    use crate::application::{CatalogEntry, LlmError, PipelineSettings, TemplateSourcePort};
    use crate::infrastructure::adapters::{FakeLlmClient, StaticCatalog};
    use crate::infrastructure::http::auth::AuthGate;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteArticleRepository,
    };
    use crate::infrastructure::worker::AutosaveWorker;

    struct NoTemplates;

    impl TemplateSourcePort for NoTemplates {
        fn load(&self, _name: &str) -> String {
            String::new()
        }
    }

    async fn server(
        llm: Arc<FakeLlmClient>,
        auth: AuthGate,
        static_dir: Option<PathBuf>,
    ) -> HttpServer {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqliteArticleRepository::new(pool));
        let autosave = Arc::new(AutosaveWorker::new(repo.clone(), Duration::from_millis(50)));
        let catalog = Arc::new(StaticCatalog::new(vec![CatalogEntry::new(
            "記事A",
            "https://a.example/",
        )]));

        let state = AppState::new(
            llm,
            Arc::new(NoTemplates),
            catalog,
            repo,
            autosave,
            PipelineSettings::default(),
            auth,
        );
        let config = ServerConfig {
            static_dir,
            ..ServerConfig::default()
        };
        HttpServer::new(config, state)
    }

    async fn router(llm: Arc<FakeLlmClient>) -> Router {
        server(llm, AuthGate::disabled(), None).await.build_router()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = router(Arc::new(FakeLlmClient::new())).await;
        let response = app.oneshot(get("/api/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_structure() {
        let llm = Arc::new(FakeLlmClient::new());
        llm.push_text("すべての情報収集が完了しました。\n## 始め方\n### 手順\n## まとめ\n## FAQ");
        let app = router(llm.clone()).await;

        let response = app
            .oneshot(post_json(
                "/api/generate-structure",
                serde_json::json!({ "mainKeyword": "Webライター", "targetReader": "初心者" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["structure"], "## 始め方\n### 手順\n## まとめ");
        assert!(json.get("outlineChange").is_none());
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_keyword_is_bad_request() {
        let llm = Arc::new(FakeLlmClient::new());
        let app = router(llm.clone()).await;

        let response = app
            .oneshot(post_json("/api/generate-structure", serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "メインキーワードが必要です");
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = router(Arc::new(FakeLlmClient::new())).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/edit-writing-part")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(response).await["error"],
            "リクエストデータの解析に失敗しました。データ形式を確認してください。"
        );
    }

    #[tokio::test]
    async fn test_timeout_maps_to_504() {
        let llm = Arc::new(FakeLlmClient::new());
        llm.push_error(LlmError::Timeout(Duration::from_secs(55)));
        let app = router(llm).await;

        let response = app
            .oneshot(post_json(
                "/api/edit-structure-part",
                serde_json::json!({
                    "selectedText": "## 始め方",
                    "editingInstruction": "具体的に",
                    "fullStructure": "## 始め方\n## まとめ",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let error = json_of(response).await["error"].as_str().unwrap().to_string();
        assert!(error.contains("55秒"));
        assert!(error.contains("分割"));
    }

    #[tokio::test]
    async fn test_task_endpoint_dispatches_by_name() {
        let llm = Arc::new(FakeLlmClient::new());
        llm.push_text("書き直した文章です。");
        let app = router(llm).await;

        let response = app
            .oneshot(post_json(
                "/api/tasks",
                serde_json::json!({
                    "task": "writing-part-edit",
                    "selectedText": "元の文章",
                    "editingInstruction": "丁寧に",
                    "fullContent": "元の文章です。",
                    "sectionTitle": "始め方",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await["editedText"], "書き直した文章です。");
    }

    #[tokio::test]
    async fn test_catalog() {
        let app = router(Arc::new(FakeLlmClient::new())).await;
        let response = app.oneshot(get("/api/catalog")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["entries"][0]["url"], "https://a.example/");
    }

    #[tokio::test]
    async fn test_article_store_lifecycle() {
        let app = router(Arc::new(FakeLlmClient::new())).await;

        let saved = app
            .clone()
            .oneshot(post_json(
                "/api/articles/save",
                serde_json::json!({ "article": { "id": "article-1", "name": "テスト記事" } }),
            ))
            .await
            .unwrap();
        assert_eq!(saved.status(), StatusCode::OK);
        assert!(json_of(saved).await["savedAt"].is_string());

        let listed = json_of(app.clone().oneshot(get("/api/articles/list")).await.unwrap()).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], "article-1");

        let outline = app
            .clone()
            .oneshot(post_json(
                "/api/articles/outline",
                serde_json::json!({ "articleId": "article-1", "outline": "## 始め方\n## まとめ" }),
            ))
            .await
            .unwrap();
        assert_eq!(outline.status(), StatusCode::OK);
        let outline = json_of(outline).await;
        assert_eq!(outline["article"]["sections"].as_array().unwrap().len(), 2);

        let deleted = app
            .clone()
            .oneshot(post_json("/api/articles/delete", serde_json::json!({ "id": "article-1" })))
            .await
            .unwrap();
        assert_eq!(json_of(deleted).await["success"], true);

        let missing = app
            .oneshot(post_json("/api/articles/get", serde_json::json!({ "id": "article-1" })))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_and_check_auth() {
        let gate = AuthGate::new(Some("open-sesame".to_string()), 30, false);
        let app = server(Arc::new(FakeLlmClient::new()), gate, None)
            .await
            .build_router();

        let unauthenticated = app.clone().oneshot(get("/api/check-auth")).await.unwrap();
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .clone()
            .oneshot(post_json("/api/login", serde_json::json!({ "password": "nope" })))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_of(wrong).await["error"], "パスワードが正しくありません");

        let ok = app
            .clone()
            .oneshot(post_json("/api/login", serde_json::json!({ "password": "open-sesame" })))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        let set_cookie = ok
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let request = Request::builder()
            .uri("/api/check-auth")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let checked = app.oneshot(request).await.unwrap();
        assert_eq!(checked.status(), StatusCode::OK);
        assert_eq!(json_of(checked).await["authenticated"], true);
    }

    #[tokio::test]
    async fn test_login_without_password_configured() {
        let app = router(Arc::new(FakeLlmClient::new())).await;
        let response = app
            .oneshot(post_json("/api/login", serde_json::json!({ "password": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(json_of(response).await["success"], true);
    }

    #[tokio::test]
    async fn test_password_gate_redirects_pages_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let gate = AuthGate::new(Some("open-sesame".to_string()), 30, false);
        let cookie = gate.set_cookie().unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();
        let app = server(
            Arc::new(FakeLlmClient::new()),
            gate,
            Some(dir.path().to_path_buf()),
        )
        .await
        .build_router();

        let page = app.clone().oneshot(get("/index.html")).await.unwrap();
        assert_eq!(page.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            page.headers().get(header::LOCATION).unwrap(),
            "/login?redirect=%2Findex.html"
        );

        let api = app.clone().oneshot(get("/api/ping")).await.unwrap();
        assert_eq!(api.status(), StatusCode::OK);

        let request = Request::builder()
            .uri("/index.html")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let authed = app.oneshot(request).await.unwrap();
        assert_eq!(authed.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pages_open_without_password() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let app = server(
            Arc::new(FakeLlmClient::new()),
            AuthGate::disabled(),
            Some(dir.path().to_path_buf()),
        )
        .await
        .build_router();

        let root = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(root.status(), StatusCode::OK);
        assert!(root.headers().get(header::LOCATION).is_none());

        let page = app.oneshot(get("/index.html")).await.unwrap();
        assert_eq!(page.status(), StatusCode::OK);
    }
}
