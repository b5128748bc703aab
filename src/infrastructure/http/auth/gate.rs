//! 密码门 - 登录 Cookie 的签发与校验
//!
//! Cookie 值为 HMAC-SHA256(key = 密码, 固定标记) 的十六进制串，
//! 修改密码后旧 Cookie 自动失效。

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_COOKIE: &str = "seo-system-auth";
const AUTH_FLAG: &[u8] = b"seo-system-authenticated";

/// 密码门
#[derive(Debug, Clone)]
pub struct AuthGate {
    password: Option<String>,
    max_age_days: i64,
    secure: bool,
}

impl AuthGate {
    pub fn new(password: Option<String>, max_age_days: i64, secure: bool) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
            max_age_days,
            secure,
        }
    }

    /// 未设置密码时所有请求放行
    pub fn disabled() -> Self {
        Self::new(None, 30, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    fn mac(key: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
        mac.update(AUTH_FLAG);
        Some(mac)
    }

    /// 当前密码对应的 Cookie 值
    fn token(&self) -> Option<String> {
        let password = self.password.as_deref()?;
        Some(hex::encode(Self::mac(password)?.finalize().into_bytes()))
    }

    /// 比较两个密码派生出的签名，不直接比较明文
    pub fn check_password(&self, candidate: &str) -> bool {
        let Some(expected) = self.token() else {
            return false;
        };
        let Ok(expected) = hex::decode(expected) else {
            return false;
        };
        Self::mac(candidate)
            .map(|mac| mac.verify_slice(&expected).is_ok())
            .unwrap_or(false)
    }

    pub fn verify_cookie(&self, value: &str) -> bool {
        let Some(password) = self.password.as_deref() else {
            return false;
        };
        let Ok(signature) = hex::decode(value.trim()) else {
            return false;
        };
        Self::mac(password)
            .map(|mac| mac.verify_slice(&signature).is_ok())
            .unwrap_or(false)
    }

    /// 从 `Cookie` 请求头中取出并校验登录 Cookie
    pub fn verify_header(&self, cookie_header: Option<&str>) -> bool {
        cookie_header
            .and_then(|header| cookie_value(header, AUTH_COOKIE))
            .is_some_and(|value| self.verify_cookie(value))
    }

    /// 登录成功后的 `Set-Cookie` 值
    pub fn set_cookie(&self) -> Option<String> {
        let token = self.token()?;
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            AUTH_COOKIE,
            token,
            self.max_age_days * 24 * 60 * 60
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        Some(cookie)
    }
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}
