//! Article Query Handlers

use std::sync::Arc;

use crate::application::commands::handlers::load_article;
use crate::application::error::ApplicationError;
use crate::application::ports::{ArticleRepositoryPort, AutosavePort};
use crate::application::queries::{GetArticle, ListArticles};
use crate::domain::{Article, ArticleSummary};

/// GetArticle Handler
pub struct GetArticleHandler {
    repo: Arc<dyn ArticleRepositoryPort>,
    autosave: Arc<dyn AutosavePort>,
}

impl GetArticleHandler {
    pub fn new(repo: Arc<dyn ArticleRepositoryPort>, autosave: Arc<dyn AutosavePort>) -> Self {
        Self { repo, autosave }
    }

    pub async fn handle(&self, query: GetArticle) -> Result<Article, ApplicationError> {
        load_article(&*self.repo, &*self.autosave, &query.id).await
    }
}

/// ListArticles Handler
pub struct ListArticlesHandler {
    repo: Arc<dyn ArticleRepositoryPort>,
}

impl ListArticlesHandler {
    pub fn new(repo: Arc<dyn ArticleRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, _query: ListArticles) -> Result<Vec<ArticleSummary>, ApplicationError> {
        Ok(self.repo.list().await?)
    }
}
