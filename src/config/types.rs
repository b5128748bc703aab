//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::{PipelineSettings, TaskTimeouts};
use crate::domain::markers::MAX_SALES_PLACEHOLDERS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 大模型配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 提示词模板
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// 内部链接候选文章
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// 密码门
    #[serde(default)]
    pub auth: AuthConfig,

    /// 管线参数
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 自动保存
    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 构建管线设置
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            writer_model: self.llm.writer_model.clone(),
            html_model: self.llm.html_model.clone(),
            timeouts: self.llm.timeouts.to_task_timeouts(),
            supervisor_name: self.pipeline.supervisor_name.clone(),
            internal_link_char_limit: self.pipeline.internal_link_char_limit,
            sales_char_limit: self.pipeline.sales_char_limit,
            supervisor_char_limit: self.pipeline.supervisor_char_limit,
            max_sections_per_request: self.pipeline.max_sections_per_request,
            max_sales_placeholders: self.pipeline.max_sales_placeholders,
            title_min_chars: self.pipeline.title_min_chars,
            title_max_chars: self.pipeline.title_max_chars,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 大模型配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,

    /// 文本任务（构成、标题、执笔、改写、收尾）
    #[serde(default = "default_writer_model")]
    pub writer_model: String,

    /// WordPress HTML 转换
    #[serde(default = "default_html_model")]
    pub html_model: String,

    /// Anthropic max_tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub timeouts: LlmTimeoutsConfig,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_writer_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_html_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            anthropic_api_key: None,
            gemini_base_url: default_gemini_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            writer_model: default_writer_model(),
            html_model: default_html_model(),
            max_tokens: default_max_tokens(),
            timeouts: LlmTimeoutsConfig::default(),
        }
    }
}

/// 各任务超时（秒），0 表示不限时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsConfig {
    #[serde(default)]
    pub outline_secs: u64,
    #[serde(default)]
    pub titles_secs: u64,
    #[serde(default)]
    pub writing_secs: u64,
    #[serde(default)]
    pub part_edit_secs: u64,
    /// 内部链接 / セールス / 监修者（每段一次调用）
    #[serde(default = "default_mutation_timeout")]
    pub mutation_secs: u64,
    #[serde(default)]
    pub finishing_secs: u64,
    #[serde(default)]
    pub html_secs: u64,
}

fn default_mutation_timeout() -> u64 {
    55
}

impl Default for LlmTimeoutsConfig {
    fn default() -> Self {
        Self {
            outline_secs: 0,
            titles_secs: 0,
            writing_secs: 0,
            part_edit_secs: 0,
            mutation_secs: default_mutation_timeout(),
            finishing_secs: 0,
            html_secs: 0,
        }
    }
}

impl LlmTimeoutsConfig {
    pub fn to_task_timeouts(&self) -> TaskTimeouts {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        TaskTimeouts {
            outline: secs(self.outline_secs),
            titles: secs(self.titles_secs),
            writing: secs(self.writing_secs),
            part_edit: secs(self.part_edit_secs),
            mutation: secs(self.mutation_secs),
            finishing: secs(self.finishing_secs),
            html: secs(self.html_secs),
        }
    }
}

/// 提示词模板配置
#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    /// 模板搜索目录（按顺序）
    #[serde(default = "default_prompt_dirs")]
    pub dirs: Vec<PathBuf>,

    /// 是否缓存已读取的模板
    #[serde(default = "default_true")]
    pub cache: bool,
}

fn default_prompt_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("prompts"),
        PathBuf::from("lib/prompts"),
        PathBuf::from("."),
    ]
}

fn default_true() -> bool {
    true
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            dirs: default_prompt_dirs(),
            cache: true,
        }
    }
}

/// 候选文章目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// 本地 JSON 回退文件
    #[serde(default = "default_fallback_paths")]
    pub fallback_paths: Vec<PathBuf>,

    /// 都失败时使用内置列表
    #[serde(default = "default_true")]
    pub builtin: bool,
}

fn default_fallback_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("data/article-list.json"),
        PathBuf::from("public/article-list.json"),
        PathBuf::from("../data/article-list.json"),
    ]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_key: None,
            fallback_paths: default_fallback_paths(),
            builtin: true,
        }
    }
}

impl CatalogConfig {
    /// 表格 ID 与 API Key 都已配置
    pub fn sheets(&self) -> Option<(&str, &str)> {
        let id = self.spreadsheet_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.api_key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((id, key))
    }
}

/// 密码门配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 未设置时不做校验
    #[serde(default)]
    pub password: Option<String>,

    /// Cookie 有效天数
    #[serde(default = "default_cookie_days")]
    pub cookie_max_age_days: i64,

    /// 仅通过 HTTPS 发送 Cookie
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_cookie_days() -> i64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: None,
            cookie_max_age_days: default_cookie_days(),
            secure_cookie: false,
        }
    }
}

/// 管线参数
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_supervisor_name")]
    pub supervisor_name: String,

    #[serde(default = "default_sections_per_request")]
    pub max_sections_per_request: usize,

    #[serde(default = "default_sales_cap")]
    pub max_sales_placeholders: usize,

    #[serde(default = "default_internal_link_limit")]
    pub internal_link_char_limit: usize,

    #[serde(default = "default_rewrite_limit")]
    pub sales_char_limit: usize,

    #[serde(default = "default_rewrite_limit")]
    pub supervisor_char_limit: usize,

    #[serde(default = "default_title_min")]
    pub title_min_chars: usize,

    #[serde(default = "default_title_max")]
    pub title_max_chars: usize,
}

fn default_supervisor_name() -> String {
    "佐藤誠一".to_string()
}

fn default_sections_per_request() -> usize {
    1
}

fn default_sales_cap() -> usize {
    MAX_SALES_PLACEHOLDERS
}

fn default_internal_link_limit() -> usize {
    3000
}

fn default_rewrite_limit() -> usize {
    2000
}

fn default_title_min() -> usize {
    30
}

fn default_title_max() -> usize {
    40
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            supervisor_name: default_supervisor_name(),
            max_sections_per_request: default_sections_per_request(),
            max_sales_placeholders: default_sales_cap(),
            internal_link_char_limit: default_internal_link_limit(),
            sales_char_limit: default_rewrite_limit(),
            supervisor_char_limit: default_rewrite_limit(),
            title_min_chars: default_title_min(),
            title_max_chars: default_title_max(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/kijiya.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 自动保存配置
#[derive(Debug, Clone, Deserialize)]
pub struct AutosaveConfig {
    /// 最后一次修改后等待的毫秒数
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    2000
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
        assert_eq!(config.llm.writer_model, "gemini-3-pro-preview");
        assert_eq!(config.database.database_url(), "sqlite:data/kijiya.db?mode=rwc");
        assert_eq!(config.autosave.debounce(), Duration::from_millis(2000));
        assert!(config.auth.password.is_none());
    }

    #[test]
    fn test_zero_timeout_means_unlimited() {
        let timeouts = LlmTimeoutsConfig::default().to_task_timeouts();
        assert_eq!(timeouts.outline, None);
        assert_eq!(timeouts.mutation, Some(Duration::from_secs(55)));
    }

    #[test]
    fn test_pipeline_settings_from_config() {
        let mut config = AppConfig::default();
        config.pipeline.supervisor_name = "山田花子".to_string();
        config.llm.html_model = "claude-opus-4-1".to_string();

        let settings = config.pipeline_settings();
        assert_eq!(settings.supervisor_name, "山田花子");
        assert_eq!(settings.html_model, "claude-opus-4-1");
        assert_eq!(settings.max_sales_placeholders, MAX_SALES_PLACEHOLDERS);
    }

    #[test]
    fn test_sheets_requires_both_values() {
        let mut catalog = CatalogConfig::default();
        assert!(catalog.sheets().is_none());
        catalog.spreadsheet_id = Some("sheet".to_string());
        catalog.api_key = Some("  ".to_string());
        assert!(catalog.sheets().is_none());
        catalog.api_key = Some("key".to_string());
        assert_eq!(catalog.sheets(), Some(("sheet", "key")));
    }
}
