//! Article Commands - 文章存储命令

use crate::domain::{Article, ArticleId, ConflictResolution, SectionId};

/// 立即保存
#[derive(Debug, Clone)]
pub struct SaveArticle {
    pub article: Article,
}

/// 延迟保存（编辑中）
#[derive(Debug, Clone)]
pub struct AutosaveArticle {
    pub article: Article,
}

/// 删除文章
#[derive(Debug, Clone)]
pub struct DeleteArticle {
    pub id: ArticleId,
}

/// 替换大纲并重新解析段落
#[derive(Debug, Clone)]
pub struct ApplyOutline {
    pub article_id: ArticleId,
    pub outline: String,
}

/// 处理合并冲突
#[derive(Debug, Clone)]
pub struct ResolveConflict {
    pub article_id: ArticleId,
    pub conflict_id: SectionId,
    pub resolution: ConflictResolution,
}
