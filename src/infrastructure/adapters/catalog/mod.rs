//! Catalog Adapter - 内部链接候选文章来源

mod fallback_catalog;
mod sheets_catalog;
mod static_catalog;

pub use fallback_catalog::FallbackCatalog;
pub use sheets_catalog::{SheetsCatalogConfig, SheetsCatalogSource};
pub use static_catalog::{builtin_entries, StaticCatalog};
