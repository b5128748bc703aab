//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，HTTP 层据此选择状态码

use thiserror::Error;

use crate::application::ports::{CatalogError, LlmError, RepositoryError};
use crate::domain::ArticleError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误（消息直接返回给调用方）
    #[error("{0}")]
    ValidationError(String),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// 模型调用失败
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// 模型有回复但提取不到可用结果
    #[error("{message}")]
    EmptyResult { message: String, raw: String },

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 依赖的数据不可用（消息直接返回给调用方）
    #[error("{0}")]
    Unavailable(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建业务规则违反错误
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }

    /// 创建空结果错误（附带模型原始回复的开头部分）
    pub fn empty_result(message: impl Into<String>, raw: &str) -> Self {
        Self::EmptyResult {
            message: message.into(),
            raw: crate::domain::text::head_chars(raw, 2000).to_string(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::not_found("Article", id),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<CatalogError> for ApplicationError {
    fn from(err: CatalogError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<ArticleError> for ApplicationError {
    fn from(err: ArticleError) -> Self {
        match err {
            ArticleError::SectionNotFound(id) => Self::not_found("Section", id.to_string()),
            ArticleError::ConflictNotFound(id) => Self::not_found("Conflict", id.to_string()),
            ArticleError::SectionHasProse(_) => Self::BusinessRuleViolation(err.to_string()),
            ArticleError::InvalidId(_) => Self::ValidationError(err.to_string()),
        }
    }
}
