//! Kijiya - SEO 记事生成流水线
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Article Context: 文章、段落、合并冲突
//! - Outline: 大纲解析与重新合并
//! - Markers: 销售位置、监修者、内部链接标记
//!
//! 应用层 (application/):
//! - Ports: 端口定义（LlmGateway, TemplateSource, ArticleCatalog, Repository, Autosave）
//! - Pipeline: 提示词组装、输出清洗、原文保留校验
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: JSON API + 密码门
//! - Adapters: Gemini / Anthropic 客户端、提示词模板、文章目录
//! - Persistence: SQLite 存储
//! - Worker: AutosaveWorker 延迟保存

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
