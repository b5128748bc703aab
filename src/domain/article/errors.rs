//! Article Context - Errors

use thiserror::Error;

use super::SectionId;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("段落不存在: {0}")]
    SectionNotFound(SectionId),

    #[error("冲突记录不存在: {0}")]
    ConflictNotFound(SectionId),

    #[error("段落已有正文，不能覆盖: {0}")]
    SectionHasProse(SectionId),

    #[error("无效的标识: {0}")]
    InvalidId(String),
}
