//! Writes observed realtime events as structured `tracing` events.

use crate::domain::{ObservedEvent, ObservedLevel, RealtimeObserver};

/// Structured event logger backed by `tracing`.
///
/// Every event carries an `event` field with the stable event name so log
/// pipelines can filter on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

macro_rules! emit {
    ($level:expr, $($field:tt)*) => {
        match $level {
            ObservedLevel::Info => ::tracing::info!($($field)*),
            ObservedLevel::Warn => ::tracing::warn!($($field)*),
            ObservedLevel::Error => ::tracing::error!($($field)*),
        }
    };
}

impl RealtimeObserver for TracingObserver {
    fn observe(&self, event: ObservedEvent) {
        let name = event.name();
        let level = event.level();

        match &event {
            ObservedEvent::AdmissionSucceeded { user_id } => {
                emit!(level, event = name, user_id = %user_id, "Connection admitted");
            }
            ObservedEvent::AdmissionFailed { error } => {
                emit!(level, event = name, reason = error.reason(), "Connection rejected");
            }
            ObservedEvent::Connected {
                user_id,
                connection_id,
            } => {
                emit!(
                    level,
                    event = name,
                    user_id = %user_id,
                    connection_id = %connection_id,
                    "Connection registered"
                );
            }
            ObservedEvent::ChannelJoined {
                user_id,
                connection_id,
                channel,
                ..
            } => {
                emit!(
                    level,
                    event = name,
                    user_id = %user_id,
                    connection_id = %connection_id,
                    channel = %channel,
                    "Joined channel"
                );
            }
            ObservedEvent::ChannelLeft {
                user_id,
                connection_id,
                channel,
                ..
            } => {
                emit!(
                    level,
                    event = name,
                    user_id = user_id.as_ref().map(|u| u.as_str()),
                    connection_id = %connection_id,
                    channel = %channel,
                    "Left channel"
                );
            }
            ObservedEvent::Broadcast {
                event: outbound,
                channel,
                origin,
                recipients,
            } => {
                emit!(
                    level,
                    event = name,
                    outbound = *outbound,
                    channel = %channel,
                    origin = origin.as_ref().map(|c| c.as_str()),
                    recipients = *recipients,
                    "Broadcast"
                );
            }
            ObservedEvent::NotificationPushed {
                recipient,
                recipients,
            } => {
                emit!(
                    level,
                    event = name,
                    user_id = %recipient,
                    recipients = *recipients,
                    "Notification pushed"
                );
            }
            ObservedEvent::NotificationSuppressed { recipient, post_id } => {
                emit!(
                    level,
                    event = name,
                    user_id = %recipient,
                    post_id = %post_id,
                    "Notification push suppressed, recipient is viewing the post"
                );
            }
            ObservedEvent::NotificationFailOpen { recipient, reason } => {
                emit!(
                    level,
                    event = name,
                    user_id = %recipient,
                    reason = %reason,
                    "Presence check failed, pushing notification anyway"
                );
            }
            ObservedEvent::ProtocolViolation {
                user_id,
                connection_id,
                event: inbound,
                reason,
            } => {
                emit!(
                    level,
                    event = name,
                    user_id = user_id.as_ref().map(|u| u.as_str()),
                    connection_id = %connection_id,
                    inbound = %inbound,
                    reason = %reason,
                    "Rejected client event"
                );
            }
            ObservedEvent::MembershipInconsistency {
                connection_id,
                detail,
            } => {
                emit!(
                    level,
                    event = name,
                    connection_id = %connection_id,
                    reason = %detail,
                    "Registry and membership disagree"
                );
            }
            ObservedEvent::Disconnected {
                user_id,
                connection_id,
                channels_left,
                reason,
            } => {
                emit!(
                    level,
                    event = name,
                    user_id = user_id.as_ref().map(|u| u.as_str()),
                    connection_id = %connection_id,
                    channels_left = *channels_left,
                    reason = %reason,
                    "Connection cleaned up"
                );
            }
        }
    }
}
