//! Request handlers.

mod http;
mod websocket;

use axum::http::{HeaderMap, header};

pub use http::{
    debug_post_viewers, debug_user_connections, deliver_comment, dispatch_notification,
    health_check, require_internal_token,
};
pub use websocket::websocket_handler;

/// `Authorization: Bearer <token>` の token 部分
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}
