//! Autosave Worker - 延迟保存
//!
//! 编辑器每次改动都会调用 `schedule`，只有静默 `debounce` 之后的最后一个版本会落盘。
//! `save_now` 和 `delete` 会让尚未执行的延迟写入失效。

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::ports::{ArticleRepositoryPort, AutosavePort, RepositoryError};
use crate::domain::{Article, ArticleId};

struct PendingWrite {
    generation: u64,
    article: Article,
}

/// 自动保存 Worker
pub struct AutosaveWorker {
    repo: Arc<dyn ArticleRepositoryPort>,
    debounce: Duration,
    /// article_id -> 最新的未保存版本
    pending: Arc<DashMap<ArticleId, PendingWrite>>,
    generation: AtomicU64,
    /// 串行化写入，旧版本不会覆盖新版本
    write_lock: Arc<Mutex<()>>,
}

impl AutosaveWorker {
    pub fn new(repo: Arc<dyn ArticleRepositoryPort>, debounce: Duration) -> Self {
        Self {
            repo,
            debounce,
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl AutosavePort for AutosaveWorker {
    fn schedule(&self, article: Article) {
        let id = article.id.clone();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending
            .insert(id.clone(), PendingWrite { generation, article });

        let pending = self.pending.clone();
        let repo = self.repo.clone();
        let write_lock = self.write_lock.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let _guard = write_lock.lock().await;
            let Some((_, write)) = pending.remove_if(&id, |_, w| w.generation == generation)
            else {
                // 已被更新的版本或立即保存取代
                return;
            };

            let mut article = write.article;
            article.mark_saved(Utc::now());
            match repo.save(&article).await {
                Ok(()) => tracing::debug!(article_id = %id, "Autosave flushed"),
                Err(e) => tracing::error!(article_id = %id, error = %e, "Autosave failed"),
            }
        });

        tracing::trace!(generation, "Autosave scheduled");
    }

    async fn save_now(&self, mut article: Article) -> Result<Article, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        self.pending.remove(&article.id);

        article.mark_saved(Utc::now());
        self.repo.save(&article).await?;
        Ok(article)
    }

    fn pending(&self, id: &ArticleId) -> Option<Article> {
        self.pending.get(id).map(|w| w.article.clone())
    }

    async fn delete(&self, id: &ArticleId) -> Result<bool, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        if self.pending.remove(id).is_some() {
            tracing::debug!(article_id = %id, "Pending autosave cancelled");
        }
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArticleInputData, ArticleSummary};
    use std::sync::Mutex as StdMutex;

    /// 记录每次写入的仓储
    #[derive(Default)]
    struct RecordingRepo {
        saved: StdMutex<Vec<Article>>,
        save_delay: Option<Duration>,
    }

    impl RecordingRepo {
        fn saved(&self) -> Vec<Article> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArticleRepositoryPort for RecordingRepo {
        async fn save(&self, article: &Article) -> Result<(), RepositoryError> {
            if let Some(delay) = self.save_delay {
                tokio::time::sleep(delay).await;
            }
            self.saved.lock().unwrap().push(article.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, RepositoryError> {
            Ok(self.saved().into_iter().rev().find(|a| &a.id == id))
        }

        async fn list(&self) -> Result<Vec<ArticleSummary>, RepositoryError> {
            Ok(self.saved().iter().map(Article::summary).collect())
        }

        async fn delete(&self, id: &ArticleId) -> Result<bool, RepositoryError> {
            let mut saved = self.saved.lock().unwrap();
            let before = saved.len();
            saved.retain(|a| &a.id != id);
            Ok(saved.len() != before)
        }
    }

    fn worker(repo: Arc<RecordingRepo>) -> AutosaveWorker {
        AutosaveWorker::new(repo, Duration::from_millis(50))
    }

    fn draft(title: &str) -> Article {
        let mut article = Article::new(ArticleInputData::default());
        article.title = title.to_string();
        article
    }

    #[tokio::test]
    async fn test_schedule_coalesces_writes() {
        let repo = Arc::new(RecordingRepo::default());
        let worker = worker(repo.clone());

        let mut article = draft("v1");
        worker.schedule(article.clone());
        article.title = "v2".to_string();
        worker.schedule(article.clone());
        article.title = "v3".to_string();
        worker.schedule(article.clone());

        assert_eq!(worker.pending(&article.id).unwrap().title, "v3");

        tokio::time::sleep(Duration::from_millis(200)).await;

        let saved = repo.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "v3");
        assert!(saved[0].saved_at.is_some());
        assert_eq!(worker.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_save_now_supersedes_scheduled_write() {
        let repo = Arc::new(RecordingRepo::default());
        let worker = worker(repo.clone());

        let mut article = draft("draft");
        worker.schedule(article.clone());
        article.title = "final".to_string();
        let saved = worker.save_now(article.clone()).await.unwrap();
        assert!(saved.saved_at.is_some());
        assert!(worker.pending(&article.id).is_none());

        tokio::time::sleep(Duration::from_millis(200)).await;

        let writes = repo.saved();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].title, "final");
    }

    #[tokio::test]
    async fn test_delete_drops_pending_write() {
        let repo = Arc::new(RecordingRepo::default());
        let worker = worker(repo.clone());

        let article = draft("discard");
        worker.schedule(article.clone());
        assert!(!worker.delete(&article.id).await.unwrap());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(repo.saved().is_empty());
    }

    #[tokio::test]
    async fn test_delete_waits_for_inflight_flush() {
        let repo = Arc::new(RecordingRepo {
            save_delay: Some(Duration::from_millis(100)),
            ..RecordingRepo::default()
        });
        let worker = AutosaveWorker::new(repo.clone(), Duration::from_millis(10));

        let article = draft("flushing");
        worker.schedule(article.clone());
        // 延迟写入已开始，正在 save 中
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(worker.delete(&article.id).await.unwrap());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(repo.find_by_id(&article.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_separate_articles_saved_independently() {
        let repo = Arc::new(RecordingRepo::default());
        let worker = worker(repo.clone());

        worker.schedule(draft("a"));
        worker.schedule(draft("b"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(repo.saved().len(), 2);
    }
}
