//! Conversion logic between DTOs and domain types.

use postwatch_shared::time::{get_utc_timestamp, iso8601_to_timestamp, timestamp_to_iso8601};
use serde_json::Value;

use crate::domain::{
    ClientEventKind, CommentAuthor, CommentEvent, InboundEvent, NotificationKind,
    NotificationRecord, OutboundEvent, PostId, ProtocolError, Timestamp, UserId, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Inbound frame → Domain
// ========================================

/// Parse one inbound text frame into a validated client event.
pub fn parse_client_frame(text: &str) -> Result<InboundEvent, ProtocolError> {
    let envelope: dto::ClientEnvelope = serde_json::from_str(text)
        .map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;

    let kind = ClientEventKind::from_name(&envelope.event)
        .ok_or_else(|| ProtocolError::UnknownEvent(envelope.event.clone()))?;

    let raw_post_id = extract_post_id(kind, envelope.data)?;
    let post_id = PostId::new(raw_post_id).map_err(|e| ProtocolError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })?;

    Ok(InboundEvent::new(kind, post_id))
}

fn extract_post_id(kind: ClientEventKind, data: Value) -> Result<String, ProtocolError> {
    match data {
        // join:post / leave:post send the id itself
        Value::String(post_id) if kind.takes_bare_post_id() => Ok(post_id),
        Value::Object(map) if !kind.takes_bare_post_id() => {
            serde_json::from_value::<dto::PostRef>(Value::Object(map))
                .map(|payload| payload.post_id)
                .map_err(|e| ProtocolError::InvalidPayload {
                    kind,
                    reason: e.to_string(),
                })
        }
        other => Err(ProtocolError::InvalidPayload {
            kind,
            reason: format!("unexpected payload {}", other),
        }),
    }
}

// ========================================
// Domain → Outbound frame
// ========================================

impl From<OutboundEvent> for dto::ServerEnvelope {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::PresenceUpdate {
                post_id,
                user_id,
                action,
            } => dto::ServerEnvelope::PresenceUpdate(dto::PresenceUpdate {
                post_id: post_id.into_string(),
                user_id: user_id.into_string(),
                action: action.as_str().to_string(),
            }),
            OutboundEvent::ReadUpdate {
                post_id,
                user_id,
                timestamp,
            } => dto::ServerEnvelope::ReadUpdate(dto::ReadUpdate {
                post_id: post_id.into_string(),
                user_id: user_id.into_string(),
                timestamp: timestamp_to_iso8601(timestamp.value()),
            }),
            OutboundEvent::TypingUpdate {
                post_id,
                user_id,
                is_typing,
            } => dto::ServerEnvelope::TypingUpdate(dto::TypingUpdate {
                post_id: post_id.into_string(),
                user_id: user_id.into_string(),
                is_typing,
            }),
            OutboundEvent::CommentNew(comment) => dto::ServerEnvelope::CommentNew(comment.into()),
            OutboundEvent::ReplyNew(comment) => dto::ServerEnvelope::ReplyNew(comment.into()),
            OutboundEvent::NotificationNew(record) => {
                dto::ServerEnvelope::NotificationNew(record.into())
            }
            OutboundEvent::SocketError {
                error_type,
                message,
            } => dto::ServerEnvelope::SocketError(dto::SocketErrorPayload {
                error_type,
                message,
            }),
        }
    }
}

impl From<CommentEvent> for dto::CommentPayload {
    fn from(comment: CommentEvent) -> Self {
        Self {
            post_id: comment.post_id.into_string(),
            comment_id: comment.comment_id,
            parent_comment_id: comment.parent_comment_id,
            author: dto::AuthorPayload {
                user_id: comment.author.user_id.into_string(),
                nickname: comment.author.nickname,
                login_id: comment.author.login_id,
                role: comment.author.role,
            },
            content: comment.content,
            created_at: timestamp_to_iso8601(comment.created_at.value()),
        }
    }
}

impl From<NotificationRecord> for dto::NotificationPayload {
    fn from(record: NotificationRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind.as_str().to_string(),
            message: record.message,
            related_post: record.related_post.map(PostId::into_string),
            related_user: record.related_user.map(UserId::into_string),
            related_comment: record.related_comment,
            read: record.read,
            created_at: timestamp_to_iso8601(record.created_at.value()),
        }
    }
}

/// Serialize an outbound event into the text frame sent on the socket.
pub fn encode_event(event: OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::ServerEnvelope::from(event))
}

// ========================================
// Bridge request → Domain
// ========================================

fn parse_created_at(value: Option<String>) -> Result<Timestamp, ValueObjectError> {
    match value {
        None => Ok(Timestamp::new(get_utc_timestamp())),
        Some(raw) => iso8601_to_timestamp(&raw)
            .map(Timestamp::new)
            .ok_or(ValueObjectError::Invalid {
                kind: "createdAt",
                value: raw,
            }),
    }
}

impl TryFrom<http::NotificationRequest> for NotificationRecord {
    type Error = ValueObjectError;

    fn try_from(request: http::NotificationRequest) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&request.kind).ok_or(ValueObjectError::Invalid {
            kind: "notification type",
            value: request.kind.clone(),
        })?;

        Ok(Self {
            id: request.id,
            recipient: UserId::new(request.recipient)?,
            kind,
            related_post: request.related_post.map(PostId::new).transpose()?,
            related_user: request.related_user.map(UserId::new).transpose()?,
            related_comment: request.related_comment,
            message: request.message,
            read: request.read,
            created_at: parse_created_at(request.created_at)?,
        })
    }
}

impl TryFrom<http::CommentRequest> for CommentEvent {
    type Error = ValueObjectError;

    fn try_from(request: http::CommentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            post_id: PostId::new(request.post_id)?,
            comment_id: request.comment_id,
            parent_comment_id: request.parent_comment_id,
            author: CommentAuthor {
                user_id: UserId::new(request.author.user_id)?,
                nickname: request.author.nickname,
                login_id: request.author.login_id,
                role: request.author.role,
            },
            content: request.content,
            created_at: parse_created_at(request.created_at)?,
            post_author_id: request.post_author_id.map(UserId::new).transpose()?,
            parent_comment_author_id: request
                .parent_comment_author_id
                .map(UserId::new)
                .transpose()?,
        })
    }
}
