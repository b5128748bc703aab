//! LLM Gateway Port - 大模型调用抽象
//!
//! 统一的 `generate(prompt, model, images, timeout) -> text` 接口，
//! 具体的 Gemini / Anthropic 客户端实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// LLM 调用错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 缺少或被拒绝的 API Key
    #[error("{provider} authentication failed: {message}")]
    ProviderAuth {
        provider: &'static str,
        message: String,
    },

    /// 配额用尽 / 频率限制（原样保留服务端提示）
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 超时（调用被放弃，未在传输层取消）
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

/// 内联图片 / PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub mime_type: String,
    /// base64 数据（不含 data URL 前缀）
    pub data: String,
}

/// 生成请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub images: Vec<ImagePart>,
    /// None 表示不限时
    pub timeout: Option<Duration>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            images: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_images(mut self, images: Vec<ImagePart>) -> Self {
        self.images = images;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// LLM Gateway Port
#[async_trait]
pub trait LlmGatewayPort: Send + Sync {
    /// 生成文本
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
