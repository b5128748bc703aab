//! Auth HTTP Handlers - 登录与登录状态

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiJson, CheckAuthResponse, LoginRequest, LoginResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let gate = &state.auth;

    if !gate.is_enabled() {
        return Ok(Json(LoginResponse {
            success: true,
            message: "パスワードが設定されていません".to_string(),
        })
        .into_response());
    }

    if !gate.check_password(&req.password) {
        return Err(ApiError::Unauthorized(
            "パスワードが正しくありません".to_string(),
        ));
    }

    let body = Json(LoginResponse {
        success: true,
        message: "ログインしました".to_string(),
    });
    match gate.set_cookie() {
        Some(cookie) => Ok(([(header::SET_COOKIE, cookie)], body).into_response()),
        None => Ok(body.into_response()),
    }
}

/// GET /api/check-auth
pub async fn check_auth(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let gate = &state.auth;
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    let authenticated = !gate.is_enabled() || gate.verify_header(cookie);

    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, Json(CheckAuthResponse { authenticated })).into_response()
}
