//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量（`KIJIYA_` 前缀）
//! 2. 常用环境变量（`GEMINI_API_KEY` 等，仅填补空缺）
//! 3. 配置文件（config.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `KIJIYA_SERVER__PORT=8080`
/// - `KIJIYA_LLM__GEMINI_API_KEY=...`
/// - `KIJIYA_AUTH__PASSWORD=...`
/// - `KIJIYA_DATABASE__PATH=/data/kijiya.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 例如: KIJIYA_LLM__GEMINI_API_KEY=...
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("KIJIYA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    // 缺省值由各结构体的 serde default 提供
    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_env_fallbacks(&mut app_config, |name| std::env::var(name).ok());
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 用常用环境变量补齐未配置的密钥
fn apply_env_fallbacks(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let fill = |slot: &mut Option<String>, name: &str| {
        let missing = slot.as_deref().map_or(true, |v| v.trim().is_empty());
        if missing {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
    };

    fill(&mut config.llm.gemini_api_key, "GEMINI_API_KEY");
    fill(&mut config.llm.anthropic_api_key, "ANTHROPIC_API_KEY");
    fill(&mut config.auth.password, "SYSTEM_PASSWORD");
    fill(&mut config.catalog.spreadsheet_id, "GOOGLE_SHEETS_SPREADSHEET_ID");
    fill(&mut config.catalog.api_key, "GOOGLE_SHEETS_API_KEY");
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.autosave.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Autosave debounce must be greater than 0".to_string(),
        ));
    }

    if config.pipeline.max_sections_per_request == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_sections_per_request must be at least 1".to_string(),
        ));
    }

    if config.pipeline.title_min_chars > config.pipeline.title_max_chars {
        return Err(ConfigError::ValidationError(format!(
            "Title window is empty ({} > {})",
            config.pipeline.title_min_chars, config.pipeline.title_max_chars
        )));
    }

    if config.prompts.dirs.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one prompt directory is required".to_string(),
        ));
    }

    Ok(())
}

fn redact(secret: &Option<String>) -> &'static str {
    match secret.as_deref() {
        Some(v) if !v.trim().is_empty() => "<set>",
        _ => "<unset>",
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("Writer Model: {}", config.llm.writer_model);
    tracing::info!("HTML Model: {}", config.llm.html_model);
    tracing::info!("Gemini API Key: {}", redact(&config.llm.gemini_api_key));
    tracing::info!("Anthropic API Key: {}", redact(&config.llm.anthropic_api_key));
    tracing::info!("Mutation Timeout: {}s", config.llm.timeouts.mutation_secs);
    tracing::info!("Prompt Dirs: {:?}", config.prompts.dirs);
    tracing::info!(
        "Catalog: {}",
        if config.catalog.sheets().is_some() {
            "google-sheets"
        } else {
            "local fallback"
        }
    );
    tracing::info!("Password Gate: {}", redact(&config.auth.password));
    tracing::info!("Supervisor: {}", config.pipeline.supervisor_name);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Autosave Debounce: {}ms", config.autosave.debounce_ms);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
