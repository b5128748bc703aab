//! Article Queries - 文章与目录查询

use crate::domain::ArticleId;

/// 获取文章
#[derive(Debug, Clone)]
pub struct GetArticle {
    pub id: ArticleId,
}

/// 列出所有文章（按保存时间倒序）
#[derive(Debug, Clone)]
pub struct ListArticles;

/// 读取内部链接候选目录
#[derive(Debug, Clone)]
pub struct GetCatalog;
