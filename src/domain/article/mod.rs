//! Article Context - 文章限界上下文
//!
//! 职责:
//! - 文章聚合（需求、大纲、段落、导语、摘要）
//! - 段落稳定标识与大纲合并冲突

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{Article, ArticleSummary, OutlineChange};
pub use entities::{ConflictResolution, MergeConflict, Section, SubHeading};
pub use errors::ArticleError;
pub use value_objects::{
    ArticleId, ArticleInputData, Attachment, AttachmentKind, HeadingLevel, SectionId,
};
