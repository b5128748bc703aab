//! Routing LLM Gateway - 按模型名分发到各服务商，并负责超时
//!
//! 超时后调用被放弃而不是取消：已发出的 HTTP 请求在后台继续执行直到结束，结果被丢弃。

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::{CompletionRequest, LlmError, LlmGatewayPort};

/// 服务商
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl Provider {
    pub fn for_model(model: &str) -> Option<Self> {
        let model = model.trim().to_ascii_lowercase();
        if model.starts_with("gemini") {
            Some(Self::Gemini)
        } else if model.starts_with("claude") {
            Some(Self::Anthropic)
        } else {
            None
        }
    }
}

/// 路由网关
pub struct RoutingLlmGateway {
    gemini: Arc<dyn LlmGatewayPort>,
    anthropic: Arc<dyn LlmGatewayPort>,
}

impl RoutingLlmGateway {
    pub fn new(gemini: Arc<dyn LlmGatewayPort>, anthropic: Arc<dyn LlmGatewayPort>) -> Self {
        Self { gemini, anthropic }
    }

    fn client_for(&self, model: &str) -> Result<Arc<dyn LlmGatewayPort>, LlmError> {
        match Provider::for_model(model) {
            Some(Provider::Gemini) => Ok(self.gemini.clone()),
            Some(Provider::Anthropic) => Ok(self.anthropic.clone()),
            None => Err(LlmError::UnknownModel(model.to_string())),
        }
    }
}

#[async_trait]
impl LlmGatewayPort for RoutingLlmGateway {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let client = self.client_for(&request.model)?;
        let model = request.model.clone();

        let Some(limit) = request.timeout else {
            return client.generate(request).await;
        };

        let call = tokio::spawn(async move { client.generate(request).await });

        match tokio::time::timeout(limit, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(LlmError::Provider(format!(
                "Provider call aborted: {}",
                join_error
            ))),
            Err(_) => {
                tracing::warn!(
                    model = %model,
                    timeout_ms = limit.as_millis() as u64,
                    "LLM call abandoned after timeout"
                );
                Err(LlmError::Timeout(limit))
            }
        }
    }
}
