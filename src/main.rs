//! Kijiya - SEO 记事生成流水线
//!
//! - Domain: article/, outline, markers
//! - Application: commands, queries, ports, pipeline
//! - Infrastructure: http, adapters, persistence, worker

use std::sync::Arc;

use kijiya::application::{ArticleCatalogPort, LlmGatewayPort};
use kijiya::config::{load_config, print_config, AppConfig};
use kijiya::infrastructure::adapters::{
    AnthropicClient, AnthropicClientConfig, FallbackCatalog, FileTemplateLoader,
    FileTemplateLoaderConfig, GeminiClient, GeminiClientConfig, RoutingLlmGateway,
    SheetsCatalogConfig, SheetsCatalogSource,
};
use kijiya::infrastructure::http::{AppState, AuthGate, HttpServer, ServerConfig};
use kijiya::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteArticleRepository,
};
use kijiya::infrastructure::worker::AutosaveWorker;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},kijiya={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 远程目录不可用时依次回退到本地 JSON 和内置列表
fn build_catalog(config: &AppConfig) -> Arc<dyn ArticleCatalogPort> {
    let remote: Option<Arc<dyn ArticleCatalogPort>> = match config.catalog.sheets() {
        Some((spreadsheet_id, api_key)) => {
            match SheetsCatalogSource::new(SheetsCatalogConfig::new(spreadsheet_id, api_key)) {
                Ok(source) => Some(Arc::new(source)),
                Err(e) => {
                    tracing::warn!(error = %e, "Google Sheets catalog disabled");
                    None
                }
            }
        }
        None => None,
    };

    Arc::new(FallbackCatalog::new(
        remote,
        config.catalog.fallback_paths.clone(),
        config.catalog.builtin,
    ))
}

fn build_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn LlmGatewayPort>> {
    let gemini = GeminiClient::new(GeminiClientConfig {
        api_key: config.llm.gemini_api_key.clone(),
        base_url: config.llm.gemini_base_url.clone(),
        ..GeminiClientConfig::default()
    })?;
    let anthropic = AnthropicClient::new(AnthropicClientConfig {
        api_key: config.llm.anthropic_api_key.clone(),
        base_url: config.llm.anthropic_base_url.clone(),
        max_tokens: config.llm.max_tokens,
        ..AnthropicClientConfig::default()
    })?;

    Ok(Arc::new(RoutingLlmGateway::new(
        Arc::new(gemini),
        Arc::new(anthropic),
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Kijiya - SEO 记事生成流水线");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let article_repo = Arc::new(SqliteArticleRepository::new(pool));
    let autosave = AutosaveWorker::new(article_repo.clone(), config.autosave.debounce()).arc();

    let gateway = build_gateway(&config)?;
    let templates = Arc::new(FileTemplateLoader::new(FileTemplateLoaderConfig {
        dirs: config.prompts.dirs.clone(),
        cache: config.prompts.cache,
        ..FileTemplateLoaderConfig::default()
    }));
    let catalog = build_catalog(&config);
    let auth = AuthGate::new(
        config.auth.password.clone(),
        config.auth.cookie_max_age_days,
        config.auth.secure_cookie,
    );

    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    if config.server.static_files.enabled {
        server_config = server_config.with_static_dir(&config.server.static_files.dir);
    }

    let state = AppState::new(
        gateway,
        templates,
        catalog,
        article_repo,
        autosave,
        config.pipeline_settings(),
        auth,
    );

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
