//! Fallback Catalog - 远程 → 本地 JSON → 内置列表 → 空
//!
//! 任何一级失败都只记录日志，`fetch` 本身不返回错误

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::static_catalog::builtin_entries;
use crate::application::ports::{
    ArticleCatalogPort, Catalog, CatalogEntry, CatalogError, CatalogSource,
};

/// 回退目录
pub struct FallbackCatalog {
    remote: Option<Arc<dyn ArticleCatalogPort>>,
    fallback_paths: Vec<PathBuf>,
    use_builtin: bool,
}

impl FallbackCatalog {
    pub fn new(
        remote: Option<Arc<dyn ArticleCatalogPort>>,
        fallback_paths: Vec<PathBuf>,
        use_builtin: bool,
    ) -> Self {
        Self {
            remote,
            fallback_paths,
            use_builtin,
        }
    }

    pub fn default_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("data/article-list.json"),
            PathBuf::from("public/article-list.json"),
            PathBuf::from("../data/article-list.json"),
        ]
    }

    async fn load_file(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::Io(e.to_string()))?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&content).map_err(|e| CatalogError::InvalidData(e.to_string()))?;

        Ok(entries
            .into_iter()
            .filter(|e| !e.title.trim().is_empty() && !e.url.trim().is_empty())
            .collect())
    }
}

#[async_trait]
impl ArticleCatalogPort for FallbackCatalog {
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        if let Some(remote) = &self.remote {
            match remote.fetch().await {
                Ok(catalog) if !catalog.is_empty() => return Ok(catalog),
                Ok(_) => tracing::warn!("Remote article catalog is empty, trying fallbacks"),
                Err(e) => tracing::warn!(error = %e, "Remote article catalog failed, trying fallbacks"),
            }
        }

        for path in &self.fallback_paths {
            match Self::load_file(path).await {
                Ok(entries) if !entries.is_empty() => {
                    tracing::info!(
                        path = %path.display(),
                        count = entries.len(),
                        "Using fallback article catalog file"
                    );
                    return Ok(Catalog::new(entries, CatalogSource::LocalFile));
                }
                Ok(_) => tracing::debug!(path = %path.display(), "Fallback catalog file is empty"),
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "Fallback catalog file unusable"),
            }
        }

        if self.use_builtin {
            tracing::info!("Using built-in article catalog");
            return Ok(Catalog::new(builtin_entries(), CatalogSource::Builtin));
        }

        tracing::error!("All article catalog sources failed");
        Ok(Catalog::new(Vec::new(), CatalogSource::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::catalog::StaticCatalog;

    struct FailingCatalog;

    #[async_trait]
    impl ArticleCatalogPort for FailingCatalog {
        async fn fetch(&self) -> Result<Catalog, CatalogError> {
            Err(CatalogError::Network("unreachable".to_string()))
        }
    }

    fn write_list(dir: &tempfile::TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("article-list.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[tokio::test]
    async fn test_remote_wins() {
        let remote: Arc<dyn ArticleCatalogPort> =
            Arc::new(StaticCatalog::new(vec![CatalogEntry::new("a", "https://a")]));
        let catalog = FallbackCatalog::new(Some(remote), Vec::new(), true)
            .fetch()
            .await
            .unwrap();
        assert_eq!(catalog.source, CatalogSource::Manual);
        assert_eq!(catalog.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_uses_first_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        let good = write_list(&dir, r#"[{"title":"記事","url":"https://example.com/x"},{"title":"","url":"https://skip"}]"#);

        let catalog = FallbackCatalog::new(
            Some(Arc::new(FailingCatalog)),
            vec![dir.path().join("missing.json"), broken, good],
            true,
        )
        .fetch()
        .await
        .unwrap();

        assert_eq!(catalog.source, CatalogSource::LocalFile);
        assert_eq!(catalog.entries, vec![CatalogEntry::new("記事", "https://example.com/x")]);
    }

    #[tokio::test]
    async fn test_builtin_when_nothing_else() {
        let catalog = FallbackCatalog::new(Some(Arc::new(FailingCatalog)), Vec::new(), true)
            .fetch()
            .await
            .unwrap();
        assert_eq!(catalog.source, CatalogSource::Builtin);
        assert!(!catalog.is_empty());
    }

    #[tokio::test]
    async fn test_empty_when_builtin_disabled() {
        let catalog = FallbackCatalog::new(None, Vec::new(), false)
            .fetch()
            .await
            .unwrap();
        assert_eq!(catalog.source, CatalogSource::Empty);
        assert!(catalog.is_empty());
    }
}
