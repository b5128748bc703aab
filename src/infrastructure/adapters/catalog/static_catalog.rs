//! Static Catalog - 固定的文章列表

use async_trait::async_trait;

use crate::application::ports::{
    ArticleCatalogPort, Catalog, CatalogEntry, CatalogError, CatalogSource,
};

/// 内置的候选文章
pub fn builtin_entries() -> Vec<CatalogEntry> {
    vec![CatalogEntry::new(
        "Webライターとは?8年経験者が解説!",
        "https://webwriter-school.net/webwriter/",
    )]
}

/// 固定列表目录
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
    source: CatalogSource,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            source: CatalogSource::Manual,
        }
    }

    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
            source: CatalogSource::Builtin,
        }
    }
}

#[async_trait]
impl ArticleCatalogPort for StaticCatalog {
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        if self.entries.is_empty() {
            return Ok(Catalog::new(Vec::new(), CatalogSource::Empty));
        }
        Ok(Catalog::new(self.entries.clone(), self.source))
    }
}
