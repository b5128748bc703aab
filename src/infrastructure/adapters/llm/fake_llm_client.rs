//! Fake LLM Client - 用于测试和离线运行
//!
//! 按顺序返回预先放入的回复；队列为空时返回默认回复。所有请求都会被记录。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{CompletionRequest, LlmError, LlmGatewayPort};

enum Reply {
    Text(String),
    Error(LlmError),
    Delayed(String, Duration),
}

/// Fake LLM Client
pub struct FakeLlmClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
    default_reply: String,
}

impl Default for FakeLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLlmClient {
    pub fn new() -> Self {
        Self::with_default_reply("")
    }

    pub fn with_default_reply(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_reply: reply.into(),
        }
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Reply::Text(text.into()));
    }

    pub fn push_error(&self, error: LlmError) {
        self.push(Reply::Error(error));
    }

    pub fn push_delayed(&self, text: impl Into<String>, delay: Duration) {
        self.push(Reply::Delayed(text.into(), delay));
    }

    /// 已收到的请求
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmGatewayPort for FakeLlmClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        tracing::debug!(
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "FakeLlmClient: returning canned reply"
        );

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(error)) => Err(error),
            Some(Reply::Delayed(text, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Ok(self.default_reply.clone()),
        }
    }
}
