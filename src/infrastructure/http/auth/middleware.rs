//! 密码门中间件
//!
//! `/api/*`、静态资源和 `/login` 始终放行；其余页面请求需要有效的登录 Cookie，
//! 否则 303 跳转到 `/login?redirect=<path>`。

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

const PUBLIC_PREFIXES: &[&str] = &["/api", "/_next/", "/static/", "/assets/"];
const PUBLIC_PATHS: &[&str] = &["/favicon.ico", "/login"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn login_location(path: &str) -> String {
    match reqwest::Url::parse_with_params("http://localhost/login", &[("redirect", path)]) {
        Ok(url) => format!("{}?{}", url.path(), url.query().unwrap_or_default()),
        Err(_) => "/login".to_string(),
    }
}

/// 密码门中间件
pub async fn password_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let gate = &state.auth;
    let path = request.uri().path().to_owned();

    if !gate.is_enabled() || is_public(&path) {
        return next.run(request).await;
    }

    let cookie = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok());
    if gate.verify_header(cookie) {
        return next.run(request).await;
    }

    tracing::debug!(path = %path, "Unauthenticated page request, redirecting to login");
    Redirect::to(&login_location(&path)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/api/generate-structure"));
        assert!(is_public("/_next/static/chunk.js"));
        assert!(is_public("/favicon.ico"));
        assert!(is_public("/login"));
        assert!(!is_public("/"));
        assert!(!is_public("/editor"));
        assert!(!is_public("/login/other"));
    }

    #[test]
    fn test_login_location_encodes_path() {
        assert_eq!(login_location("/"), "/login?redirect=%2F");
        assert_eq!(login_location("/articles/a b"), "/login?redirect=%2Farticles%2Fa+b");
    }
}
