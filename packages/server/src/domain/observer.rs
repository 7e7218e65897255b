//! Observability seam.
//!
//! Use cases report what happened at fixed points (admission, join, leave,
//! broadcast, dispatch, cleanup) instead of logging ad hoc. The infrastructure
//! layer decides how those points are written out.

use super::{
    error::AuthError,
    value_object::{ChannelId, ConnectionId, PostId, UserId},
};

/// Severity of an observed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    AdmissionSucceeded {
        user_id: UserId,
    },
    AdmissionFailed {
        error: AuthError,
    },
    Connected {
        user_id: UserId,
        connection_id: ConnectionId,
    },
    ChannelJoined {
        user_id: UserId,
        connection_id: ConnectionId,
        channel: ChannelId,
        duplicate: bool,
    },
    ChannelLeft {
        user_id: Option<UserId>,
        connection_id: ConnectionId,
        channel: ChannelId,
        on_disconnect: bool,
    },
    Broadcast {
        event: &'static str,
        channel: ChannelId,
        origin: Option<ConnectionId>,
        recipients: usize,
    },
    NotificationPushed {
        recipient: UserId,
        recipients: usize,
    },
    NotificationSuppressed {
        recipient: UserId,
        post_id: PostId,
    },
    NotificationFailOpen {
        recipient: UserId,
        reason: String,
    },
    ProtocolViolation {
        user_id: Option<UserId>,
        connection_id: ConnectionId,
        event: String,
        reason: String,
    },
    MembershipInconsistency {
        connection_id: ConnectionId,
        detail: String,
    },
    Disconnected {
        user_id: Option<UserId>,
        connection_id: ConnectionId,
        channels_left: usize,
        reason: String,
    },
}

impl ObservedEvent {
    /// Stable event name used as the `event` log field.
    pub fn name(&self) -> &'static str {
        match self {
            ObservedEvent::AdmissionSucceeded { .. } => "socket:auth:success",
            ObservedEvent::AdmissionFailed { .. } => "socket:auth:failed",
            ObservedEvent::Connected { .. } => "socket:connected",
            ObservedEvent::ChannelJoined {
                channel: ChannelId::User(_),
                ..
            } => "socket:join:user",
            ObservedEvent::ChannelJoined {
                duplicate: true, ..
            } => "socket:join:post:duplicate",
            ObservedEvent::ChannelJoined { .. } => "socket:join:post",
            ObservedEvent::ChannelLeft {
                on_disconnect: true,
                ..
            } => "socket:leave:post:disconnect",
            ObservedEvent::ChannelLeft { .. } => "socket:leave:post",
            ObservedEvent::Broadcast { .. } => "socket:broadcast",
            ObservedEvent::NotificationPushed { .. } => "notification:pushed",
            ObservedEvent::NotificationSuppressed { .. } => "notification:suppressed",
            ObservedEvent::NotificationFailOpen { .. } => "notification:presence:fail_open",
            ObservedEvent::ProtocolViolation { .. } => "socket:protocol:error",
            ObservedEvent::MembershipInconsistency { .. } => "socket:membership:inconsistent",
            ObservedEvent::Disconnected { .. } => "socket:disconnected",
        }
    }

    pub fn level(&self) -> ObservedLevel {
        match self {
            ObservedEvent::AdmissionFailed {
                error: AuthError::NoToken,
            } => ObservedLevel::Warn,
            ObservedEvent::AdmissionFailed { .. }
            | ObservedEvent::ProtocolViolation { .. }
            | ObservedEvent::MembershipInconsistency { .. } => ObservedLevel::Error,
            ObservedEvent::NotificationFailOpen { .. } => ObservedLevel::Warn,
            _ => ObservedLevel::Info,
        }
    }
}

/// Receives observed events. Must not block.
pub trait RealtimeObserver: Send + Sync {
    fn observe(&self, event: ObservedEvent);
}
