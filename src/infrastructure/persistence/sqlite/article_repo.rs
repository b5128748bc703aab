//! SQLite Article Repository
//!
//! 每篇文章一条索引记录 + 一条 JSON 文档记录，写入在同一事务中完成

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{ArticleRepositoryPort, RepositoryError};
use crate::domain::{Article, ArticleId, ArticleSummary};

/// SQLite Article Repository
pub struct SqliteArticleRepository {
    pool: DbPool,
}

impl SqliteArticleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    // 固定宽度，按文本排序即按时间排序
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(FromRow)]
struct IndexRow {
    id: String,
    name: String,
    title: String,
    main_keyword: String,
    saved_at: String,
}

impl TryFrom<IndexRow> for ArticleSummary {
    type Error = RepositoryError;

    fn try_from(row: IndexRow) -> Result<Self, Self::Error> {
        Ok(ArticleSummary {
            id: ArticleId::parse(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            title: row.title,
            main_keyword: row.main_keyword,
            saved_at: DateTime::parse_from_rfc3339(&row.saved_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[derive(FromRow)]
struct DocumentRow {
    document: String,
}

#[async_trait]
impl ArticleRepositoryPort for SqliteArticleRepository {
    async fn save(&self, article: &Article) -> Result<(), RepositoryError> {
        let summary = article.summary();
        let saved_at = timestamp(summary.saved_at);
        let document = serde_json::to_string(article)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO article_index (id, name, title, main_keyword, saved_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                title = excluded.title,
                main_keyword = excluded.main_keyword,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(summary.id.as_str())
        .bind(&summary.name)
        .bind(&summary.title)
        .bind(&summary.main_keyword)
        .bind(&saved_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO article_documents (id, document, saved_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(summary.id.as_str())
        .bind(&document)
        .bind(&saved_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        tracing::debug!(
            article_id = %summary.id,
            bytes = document.len(),
            sections = article.sections.len(),
            "Article persisted"
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, RepositoryError> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT document FROM article_documents WHERE id = ?")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(|r| {
            serde_json::from_str(&r.document)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))
        })
        .transpose()
    }

    async fn list(&self) -> Result<Vec<ArticleSummary>, RepositoryError> {
        let rows: Vec<IndexRow> = sqlx::query_as(
            "SELECT id, name, title, main_keyword, saved_at FROM article_index ORDER BY saved_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ArticleSummary::try_from).collect()
    }

    async fn delete(&self, id: &ArticleId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM article_documents WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM article_index WHERE id = ?")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArticleInputData, Attachment};
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::Duration;

    async fn repo() -> SqliteArticleRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteArticleRepository::new(pool)
    }

    fn article(keyword: &str) -> Article {
        let mut article = Article::new(ArticleInputData {
            main_keyword: keyword.to_string(),
            ..Default::default()
        });
        article.apply_outline("## 始め方\n### 準備\n## まとめ");
        article.mark_saved(Utc::now());
        article
    }

    #[tokio::test]
    async fn test_save_and_find_roundtrip() {
        let repo = repo().await;
        let mut original = article("Webライター");
        let id = original.sections[0].id.clone();
        original.set_prose(&id, "本文").unwrap();

        repo.save(&original).await.unwrap();
        let found = repo.find_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(found, original);
    }

    #[tokio::test]
    async fn test_attachments_not_persisted() {
        let repo = repo().await;
        let mut original = article("副業");
        original.sections[0].attachments.push(Attachment {
            name: "memo.txt".to_string(),
            mime_type: "text/plain".to_string(),
            content: "data:text/plain;base64,44Oh44Oi".to_string(),
        });

        repo.save(&original).await.unwrap();
        let found = repo.find_by_id(&original.id).await.unwrap().unwrap();
        assert!(found.sections[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo().await;
        let mut older = article("古い");
        older.mark_saved(Utc::now() - Duration::minutes(5));
        let newer = article("新しい");

        repo.save(&older).await.unwrap();
        repo.save(&newer).await.unwrap();

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, newer.id);
        assert_eq!(list[0].name, "新しい");
        assert_eq!(list[1].id, older.id);
    }

    #[tokio::test]
    async fn test_save_overwrites_index() {
        let repo = repo().await;
        let mut a = article("初版");
        repo.save(&a).await.unwrap();
        a.title = "改訂タイトル".to_string();
        repo.save(&a).await.unwrap();

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "改訂タイトル");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let a = article("削除");
        repo.save(&a).await.unwrap();

        assert!(repo.delete(&a.id).await.unwrap());
        assert!(repo.find_by_id(&a.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
        assert!(!repo.delete(&a.id).await.unwrap());
    }
}
