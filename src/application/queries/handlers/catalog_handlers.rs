//! Catalog Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ArticleCatalogPort, Catalog};
use crate::application::queries::GetCatalog;

/// GetCatalog Handler
pub struct GetCatalogHandler {
    catalog: Arc<dyn ArticleCatalogPort>,
}

impl GetCatalogHandler {
    pub fn new(catalog: Arc<dyn ArticleCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: GetCatalog) -> Result<Catalog, ApplicationError> {
        let catalog = self.catalog.fetch().await?;
        tracing::debug!(entries = catalog.entries.len(), source = ?catalog.source, "Catalog fetched");
        Ok(catalog)
    }
}
