//! Repository Ports - 出站端口
//!
//! 定义文章持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Article, ArticleId, ArticleSummary};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Article Repository Port
///
/// 每篇文章存两份：索引记录（列表用）和完整文档。附件不会被序列化。
#[async_trait]
pub trait ArticleRepositoryPort: Send + Sync {
    /// 保存（插入或覆盖）索引与文档
    async fn save(&self, article: &Article) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, RepositoryError>;

    /// 按保存时间倒序列出
    async fn list(&self) -> Result<Vec<ArticleSummary>, RepositoryError>;

    /// 删除索引与文档，返回是否存在
    async fn delete(&self, id: &ArticleId) -> Result<bool, RepositoryError>;
}

/// 自动保存端口
///
/// `schedule` 在最后一次变更后延迟写入；`save_now` 立即写入并取消同一文章尚未执行的延迟写入，
/// 保证改写结果总是最后落盘。
#[async_trait]
pub trait AutosavePort: Send + Sync {
    fn schedule(&self, article: Article);

    async fn save_now(&self, article: Article) -> Result<Article, RepositoryError>;

    /// 尚未落盘的最新版本（读取文章时优先于仓储）
    fn pending(&self, id: &ArticleId) -> Option<Article>;

    /// 删除文章：丢弃尚未执行的延迟写入，并排在正在进行的写入之后执行
    async fn delete(&self, id: &ArticleId) -> Result<bool, RepositoryError>;
}
