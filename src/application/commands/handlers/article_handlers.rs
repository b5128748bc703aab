//! Article Command Handlers - 文章存储

use std::sync::Arc;

use super::load_article;
use crate::application::commands::{
    ApplyOutline, AutosaveArticle, DeleteArticle, ResolveConflict, SaveArticle,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{ArticleRepositoryPort, AutosavePort};
use crate::domain::{Article, ArticleId, OutlineChange};

/// SaveArticle Handler - 立即保存
pub struct SaveArticleHandler {
    autosave: Arc<dyn AutosavePort>,
}

impl SaveArticleHandler {
    pub fn new(autosave: Arc<dyn AutosavePort>) -> Self {
        Self { autosave }
    }

    pub async fn handle(&self, cmd: SaveArticle) -> Result<Article, ApplicationError> {
        let article = self.autosave.save_now(cmd.article).await?;
        tracing::info!(article_id = %article.id, name = %article.display_name(), "Article saved");
        Ok(article)
    }
}

/// AutosaveArticle Handler - 延迟保存
pub struct AutosaveArticleHandler {
    autosave: Arc<dyn AutosavePort>,
}

impl AutosaveArticleHandler {
    pub fn new(autosave: Arc<dyn AutosavePort>) -> Self {
        Self { autosave }
    }

    pub fn handle(&self, cmd: AutosaveArticle) -> ArticleId {
        let id = cmd.article.id.clone();
        self.autosave.schedule(cmd.article);
        id
    }
}

/// DeleteArticle Handler
pub struct DeleteArticleHandler {
    autosave: Arc<dyn AutosavePort>,
}

impl DeleteArticleHandler {
    pub fn new(autosave: Arc<dyn AutosavePort>) -> Self {
        Self { autosave }
    }

    pub async fn handle(&self, cmd: DeleteArticle) -> Result<(), ApplicationError> {
        if !self.autosave.delete(&cmd.id).await? {
            return Err(ApplicationError::not_found("Article", cmd.id.as_str()));
        }
        tracing::info!(article_id = %cmd.id, "Article deleted");
        Ok(())
    }
}

/// ApplyOutline Handler - 替换大纲并重新解析段落
pub struct ApplyOutlineHandler {
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl ApplyOutlineHandler {
    pub fn new(repo: Arc<dyn ArticleRepositoryPort>, autosave: Arc<dyn AutosavePort>) -> Self {
        Self { repo, autosave }
    }

    pub async fn handle(&self, cmd: ApplyOutline) -> Result<(Article, OutlineChange), ApplicationError> {
        let mut article = load_article(&*self.repo, &*self.autosave, &cmd.article_id).await?;
        let change = article.apply_outline(cmd.outline);
        if change.new_conflicts > 0 {
            tracing::warn!(
                article_id = %article.id,
                new_conflicts = change.new_conflicts,
                "Written sections no longer match the outline"
            );
        }
        let article = self.autosave.save_now(article).await?;
        Ok((article, change))
    }
}

/// ResolveConflict Handler - 处理合并冲突
pub struct ResolveConflictHandler {
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl ResolveConflictHandler {
    pub fn new(repo: Arc<dyn ArticleRepositoryPort>, autosave: Arc<dyn AutosavePort>) -> Self {
        Self { repo, autosave }
    }

    pub async fn handle(&self, cmd: ResolveConflict) -> Result<Article, ApplicationError> {
        let mut article = load_article(&*self.repo, &*self.autosave, &cmd.article_id).await?;
        article.resolve_conflict(&cmd.conflict_id, cmd.resolution)?;
        Ok(self.autosave.save_now(article).await?)
    }
}
