//! Anthropic Client - Messages API
//!
//! POST {base_url}/v1/messages，单条 user 消息，仅文本

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{CompletionRequest, LlmError, LlmGatewayPort};

const PROVIDER: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";
const AUTH_REMEDIATION: &str =
    "Claude APIの認証に失敗しました。ANTHROPIC_API_KEY環境変数が正しく設定されているか確認してください。";

/// Anthropic 客户端配置
#[derive(Debug, Clone)]
pub struct AnthropicClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_tokens: u32,
    pub connect_timeout_secs: u64,
}

impl Default for AnthropicClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: String,
}

/// Anthropic 客户端
pub struct AnthropicClient {
    client: Client,
    config: AnthropicClientConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        let raw = self.config.api_key.as_deref().unwrap_or_default();
        let key = raw.trim();
        if key.is_empty() {
            return Err(LlmError::ProviderAuth {
                provider: PROVIDER,
                message: "ANTHROPIC_API_KEY is not set".to_string(),
            });
        }
        if key.len() != raw.len() {
            tracing::warn!("ANTHROPIC_API_KEY has surrounding whitespace, trimmed");
        }
        if !key.starts_with("sk-ant-") {
            tracing::warn!("ANTHROPIC_API_KEY format may be incorrect (expected sk-ant-...)");
        }
        Ok(key)
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

fn extract_text(response: MessageResponse) -> Result<String, LlmError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text)
        .collect();

    if text.is_empty() {
        return Err(LlmError::InvalidResponse(format!(
            "No text content (stop reason: {})",
            response.stop_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

fn classify_error(status: StatusCode, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let error_type = parsed
        .as_ref()
        .map(|e| e.error.error_type.as_str())
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::UNAUTHORIZED
        || error_type == "authentication_error"
        || message.contains("invalid x-api-key")
    {
        LlmError::ProviderAuth {
            provider: PROVIDER,
            message: AUTH_REMEDIATION.to_string(),
        }
    } else if status == StatusCode::TOO_MANY_REQUESTS || error_type == "rate_limit_error" {
        LlmError::RateLimited(message)
    } else {
        LlmError::Provider(format!("HTTP {}: {}", status, message))
    }
}

#[async_trait]
impl LlmGatewayPort for AnthropicClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let api_key = self.api_key()?;

        if !request.images.is_empty() {
            tracing::warn!(
                images = request.images.len(),
                "Anthropic requests are text-only, images dropped"
            );
        }

        let prompt_chars = request.prompt.chars().count();
        if prompt_chars > 200_000 {
            tracing::warn!(prompt_chars, "Prompt is very long, may time out or be truncated");
        }

        let body = MessageRequest {
            model: &request.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        tracing::debug!(model = %request.model, prompt_chars, "Sending Anthropic request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Network(format!("Cannot connect to Anthropic API: {}", e))
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &error_text));
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        extract_text(parsed)
    }
}
