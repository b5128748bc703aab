//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod article_catalog;
mod llm_gateway;
mod repositories;
mod template_source;

pub use article_catalog::{ArticleCatalogPort, Catalog, CatalogEntry, CatalogError, CatalogSource};
pub use llm_gateway::{CompletionRequest, ImagePart, LlmError, LlmGatewayPort};
pub use repositories::{ArticleRepositoryPort, AutosavePort, RepositoryError};
pub use template_source::{names as template_names, TemplateSourcePort};
