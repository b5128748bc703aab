//! Template Adapter - 提示词模板文件

mod file_template_loader;

pub use file_template_loader::{FileTemplateLoader, FileTemplateLoaderConfig};
