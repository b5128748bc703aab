//! Password Gate - 简单的共享密码保护

mod gate;
mod middleware;

pub use gate::{AuthGate, AUTH_COOKIE};
pub use middleware::password_gate;
