//! Article Catalog Port - 内部链接候选文章列表

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 目录读取错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog source not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid catalog data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// 目录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub url: String,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// 提示词中的一行：`标题 (URL)`
    pub fn prompt_line(&self) -> String {
        format!("{} ({})", self.title, self.url)
    }
}

/// 目录来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogSource {
    /// 请求体中直接给出
    Manual,
    GoogleSheets,
    LocalFile,
    Builtin,
    Empty,
}

/// 目录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub source: CatalogSource,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>, source: CatalogSource) -> Self {
        Self { entries, source }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Article Catalog Port
#[async_trait]
pub trait ArticleCatalogPort: Send + Sync {
    async fn fetch(&self) -> Result<Catalog, CatalogError>;
}
