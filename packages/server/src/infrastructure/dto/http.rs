//! HTTP body DTOs for the internal bridge and the inspection routes.

use serde::{Deserialize, Serialize};

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `POST /internal/notifications`: a record the REST side already stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub recipient: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub related_post: Option<String>,
    #[serde(default)]
    pub related_user: Option<String>,
    #[serde(default)]
    pub related_comment: Option<String>,
    #[serde(default)]
    pub read: bool,
    /// ISO8601. Missing means "now".
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthorRequest {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub nickname: String,
    #[serde(rename = "id")]
    pub login_id: String,
    #[serde(default)]
    pub role: String,
}

/// Body of `POST /internal/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub post_id: String,
    pub comment_id: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    pub author: CommentAuthorRequest,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub post_author_id: Option<String>,
    #[serde(default)]
    pub parent_comment_author_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDispatchResponse {
    pub delivered: bool,
    pub recipients: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDispatchResponse {
    pub deliveries: usize,
    pub recipients: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConnectionsResponse {
    pub user_id: String,
    pub connections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostViewersResponse {
    pub post_id: String,
    pub viewers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
