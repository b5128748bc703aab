//! Domain Layer - 领域层
//!
//! - Article Context: 文章、段落、合并冲突
//! - outline: 大纲解析与段落合并
//! - markers: 改写任务使用的标记记号
//! - text: 按字符截断等文本工具

pub mod article;
pub mod markers;
pub mod outline;
pub mod text;

pub use article::{
    Article, ArticleError, ArticleId, ArticleInputData, ArticleSummary, Attachment,
    ConflictResolution, HeadingLevel, MergeConflict, OutlineChange, Section, SectionId, SubHeading,
};
