//! Gemini Client - Google Generative Language API
//!
//! POST {base_url}/v1beta/models/{model}:generateContent?key=...
//! 图片 / PDF 以 inline_data 方式附在文本之后

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{CompletionRequest, LlmError, LlmGatewayPort};

const PROVIDER: &str = "Gemini";

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub connect_timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Gemini 客户端
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(LlmError::ProviderAuth {
                provider: PROVIDER,
                message: "GEMINI_API_KEY is not set".to_string(),
            }),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

fn build_request(request: &CompletionRequest) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: request.prompt.clone(),
    }];
    parts.extend(request.images.iter().map(|image| Part::Inline {
        inline_data: InlineData {
            mime_type: image.mime_type.clone(),
            data: image.data.clone(),
        },
    }));

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
    }
}

/// 拼接第一个候选的全部文本片段
fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Provider(format!("Prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::InvalidResponse(format!(
            "Empty candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

fn classify_error(status: StatusCode, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let api_status = parsed.map(|e| e.error.status).unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || message.contains("API key not valid")
    {
        LlmError::ProviderAuth {
            provider: PROVIDER,
            message,
        }
    } else if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        LlmError::RateLimited(message)
    } else {
        LlmError::Provider(format!("HTTP {}: {}", status, message))
    }
}

#[async_trait]
impl LlmGatewayPort for GeminiClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let body = build_request(&request);

        tracing::debug!(
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            images = request.images.len(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Network(format!("Cannot connect to Gemini API: {}", e))
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &error_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ImagePart;

    #[test]
    fn test_request_body_includes_inline_data() {
        let request = CompletionRequest::new("構成を作成", "gemini-3-pro-preview").with_images(vec![
            ImagePart {
                mime_type: "application/pdf".to_string(),
                data: "JVBERi0=".to_string(),
            },
        ]);

        let json = serde_json::to_value(build_request(&request)).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(parts[0]["text"], "構成を作成");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "application/pdf");
        assert_eq!(parts[1]["inline_data"]["data"], "JVBERi0=");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let raw = r###"{"candidates":[{"content":{"parts":[{"text":"## 見出し"},{"text":"\n本文"}]},"finishReason":"STOP"}]}"###;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(response).unwrap(), "## 見出し\n本文");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(extract_text(response), Err(LlmError::Provider(_))));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let raw = r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_classify_quota_error() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match classify_error(StatusCode::TOO_MANY_REQUESTS, body) {
            LlmError::RateLimited(message) => assert_eq!(message, "Quota exceeded"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_classify_invalid_key() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            classify_error(StatusCode::BAD_REQUEST, body),
            LlmError::ProviderAuth { provider: "Gemini", .. }
        ));
    }

    #[test]
    fn test_classify_plain_text_error() {
        let err = classify_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "Provider error: HTTP 502 Bad Gateway: upstream down");
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_error() {
        let client = GeminiClient::new(GeminiClientConfig::default()).unwrap();
        let result = client
            .generate(CompletionRequest::new("x", "gemini-3-pro-preview"))
            .await;
        assert!(matches!(result, Err(LlmError::ProviderAuth { .. })));
    }
}
