//! WebSocket frame DTOs.
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound frame before the event name is resolved.
///
/// `data` is kept raw because `join:post` / `leave:post` carry a bare string
/// while the other events carry an object.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// `{postId}` payload of the view, read and typing events.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRef {
    #[serde(rename = "postId")]
    pub post_id: String,
}

/// Outbound frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEnvelope {
    #[serde(rename = "post:view:presence:update")]
    PresenceUpdate(PresenceUpdate),
    #[serde(rename = "post:read:update")]
    ReadUpdate(ReadUpdate),
    #[serde(rename = "comment:typing:update")]
    TypingUpdate(TypingUpdate),
    #[serde(rename = "comment:new")]
    CommentNew(CommentPayload),
    #[serde(rename = "reply:new")]
    ReplyNew(CommentPayload),
    #[serde(rename = "notification:new")]
    NotificationNew(NotificationPayload),
    #[serde(rename = "socket:error")]
    SocketError(SocketErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub post_id: String,
    pub user_id: String,
    /// "start" | "end"
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadUpdate {
    pub post_id: String,
    pub user_id: String,
    /// ISO8601 with milliseconds
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUpdate {
    pub post_id: String,
    pub user_id: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorPayload {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub nickname: String,
    /// login id
    #[serde(rename = "id")]
    pub login_id: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub post_id: String,
    pub comment_id: String,
    pub parent_comment_id: Option<String>,
    pub author: AuthorPayload,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub related_post: Option<String>,
    pub related_user: Option<String>,
    pub related_comment: Option<String>,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketErrorPayload {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
