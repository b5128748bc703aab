//! HTTP Error Handling
//!
//! 失败响应统一为 `{"error": "..."}` 加对应的 HTTP 状态码

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, LlmError};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// 模型原始回复的开头部分（仅提取失败时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    RateLimited(String),
    GatewayTimeout(String),
    Internal(String),
    /// 模型有回复但提取不到结果
    EmptyResult { message: String, raw: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) | ApiError::EmptyResult { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let response = match self {
            ApiError::EmptyResult { message, raw } => {
                tracing::error!(status = status.as_u16(), error = %message, raw_chars = raw.chars().count(), "No usable result in model output");
                ErrorResponse {
                    error: message,
                    raw: Some(raw),
                }
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::RateLimited(msg)
            | ApiError::GatewayTimeout(msg)
            | ApiError::Internal(msg) => {
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %msg, "Request failed");
                } else {
                    tracing::warn!(status = status.as_u16(), error = %msg, "Request rejected");
                }
                ErrorResponse {
                    error: msg,
                    raw: None,
                }
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::ProviderAuth { .. } => ApiError::Unauthorized(e.to_string()),
            LlmError::RateLimited(_) => ApiError::RateLimited(e.to_string()),
            LlmError::Timeout(limit) => ApiError::GatewayTimeout(format!(
                "処理がタイムアウトしました（{}秒）。記事を短く分割するか、添付ファイルを減らしてください。",
                limit.as_secs()
            )),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::BusinessRuleViolation(msg) => ApiError::Conflict(msg),
            ApplicationError::Llm(llm) => llm.into(),
            ApplicationError::EmptyResult { message, raw } => ApiError::EmptyResult { message, raw },
            ApplicationError::RepositoryError(_)
            | ApplicationError::Unavailable(_)
            | ApplicationError::ExternalServiceError(_)
            | ApplicationError::InternalError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApplicationError, StatusCode)> = vec![
            (ApplicationError::validation("x"), StatusCode::BAD_REQUEST),
            (ApplicationError::not_found("Article", "a"), StatusCode::NOT_FOUND),
            (
                LlmError::ProviderAuth {
                    provider: "Gemini",
                    message: "bad key".to_string(),
                }
                .into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                LlmError::RateLimited("quota".to_string()).into(),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                LlmError::Timeout(Duration::from_secs(55)).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                LlmError::Network("down".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApplicationError::Unavailable("記事一覧データが取得できませんでした".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_validation_message_passes_through() {
        let response = ApiError::from(ApplicationError::validation("キーワードが必要です")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "キーワードが必要です");
        assert!(json.get("raw").is_none());
    }

    #[tokio::test]
    async fn test_empty_result_includes_raw() {
        let error = ApplicationError::empty_result("タイトルを抽出できませんでした", "モデルの回答");
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "タイトルを抽出できませんでした");
        assert_eq!(json["raw"], "モデルの回答");
    }
}
