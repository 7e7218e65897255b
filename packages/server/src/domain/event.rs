//! Inbound client signals, outbound server events and deliveries.
//!
//! Use cases take an [`InboundEvent`] and return a list of [`Delivery`]
//! values. Only the transport adapter turns deliveries into socket writes.

use super::{
    entity::{CommentEvent, NotificationRecord},
    value_object::{ChannelId, ConnectionId, PostId, Timestamp, UserId},
};

/// Client → server event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEventKind {
    /// `join:post`: subscribe without presence semantics.
    JoinPost,
    /// `leave:post`: compat alias for view end.
    LeavePost,
    ViewStart,
    ViewEnd,
    Read,
    TypingStart,
    TypingEnd,
}

impl ClientEventKind {
    pub const ALL: [ClientEventKind; 7] = [
        ClientEventKind::JoinPost,
        ClientEventKind::LeavePost,
        ClientEventKind::ViewStart,
        ClientEventKind::ViewEnd,
        ClientEventKind::Read,
        ClientEventKind::TypingStart,
        ClientEventKind::TypingEnd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClientEventKind::JoinPost => "join:post",
            ClientEventKind::LeavePost => "leave:post",
            ClientEventKind::ViewStart => "post:view:start",
            ClientEventKind::ViewEnd => "post:view:end",
            ClientEventKind::Read => "post:read",
            ClientEventKind::TypingStart => "comment:typing:start",
            ClientEventKind::TypingEnd => "comment:typing:end",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// `join:post` and `leave:post` carry the post id as a bare string.
    pub fn takes_bare_post_id(&self) -> bool {
        matches!(self, ClientEventKind::JoinPost | ClientEventKind::LeavePost)
    }

    /// Message sent back in `socket:error` when handling this event fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ClientEventKind::JoinPost => "Failed to join post room",
            ClientEventKind::LeavePost => "Failed to leave post room",
            ClientEventKind::ViewStart => "Failed to start post view",
            ClientEventKind::ViewEnd => "Failed to end post view",
            ClientEventKind::Read => "Failed to process read receipt",
            ClientEventKind::TypingStart => "Failed to start typing indicator",
            ClientEventKind::TypingEnd => "Failed to end typing indicator",
        }
    }
}

/// A validated client signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: ClientEventKind,
    pub post_id: PostId,
}

impl InboundEvent {
    pub fn new(kind: ClientEventKind, post_id: PostId) -> Self {
        Self { kind, post_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceAction {
    Start,
    End,
}

impl PresenceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceAction::Start => "start",
            PresenceAction::End => "end",
        }
    }
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    PresenceUpdate {
        post_id: PostId,
        user_id: UserId,
        action: PresenceAction,
    },
    ReadUpdate {
        post_id: PostId,
        user_id: UserId,
        timestamp: Timestamp,
    },
    TypingUpdate {
        post_id: PostId,
        user_id: UserId,
        is_typing: bool,
    },
    CommentNew(CommentEvent),
    ReplyNew(CommentEvent),
    NotificationNew(NotificationRecord),
    SocketError {
        error_type: String,
        message: String,
    },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::PresenceUpdate { .. } => "post:view:presence:update",
            OutboundEvent::ReadUpdate { .. } => "post:read:update",
            OutboundEvent::TypingUpdate { .. } => "comment:typing:update",
            OutboundEvent::CommentNew(_) => "comment:new",
            OutboundEvent::ReplyNew(_) => "reply:new",
            OutboundEvent::NotificationNew(_) => "notification:new",
            OutboundEvent::SocketError { .. } => "socket:error",
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        OutboundEvent::SocketError {
            error_type: "server_error".to_string(),
            message: message.into(),
        }
    }
}

/// Where a delivery was addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    Channel(ChannelId),
    Connection(ConnectionId),
}

/// One outbound event and the connections it must reach.
///
/// Recipients are resolved when the delivery is built, so a later leave cannot
/// change who an already-computed fan-out reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub target: DeliveryTarget,
    pub recipients: Vec<ConnectionId>,
    pub event: OutboundEvent,
}

impl Delivery {
    pub fn to_connection(connection_id: ConnectionId, event: OutboundEvent) -> Self {
        Self {
            target: DeliveryTarget::Connection(connection_id.clone()),
            recipients: vec![connection_id],
            event,
        }
    }

    pub fn to_channel(
        channel: ChannelId,
        mut recipients: Vec<ConnectionId>,
        event: OutboundEvent,
    ) -> Self {
        recipients.sort();
        Self {
            target: DeliveryTarget::Channel(channel),
            recipients,
            event,
        }
    }

    pub fn reaches(&self, connection_id: &ConnectionId) -> bool {
        self.recipients.contains(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_kind_names_round_trip() {
        // テスト項目: 全てのイベント名が種別と相互変換できる
        // given (前提条件):
        let kinds = ClientEventKind::ALL;

        // when (操作) / then (期待する結果):
        for kind in kinds {
            assert_eq!(ClientEventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ClientEventKind::from_name("post:delete"), None);
    }

    #[test]
    fn test_only_compat_events_take_bare_post_id() {
        // テスト項目: join:post / leave:post のみ文字列ペイロードを取る
        // given (前提条件):
        let bare: Vec<_> = ClientEventKind::ALL
            .into_iter()
            .filter(ClientEventKind::takes_bare_post_id)
            .collect();

        // then (期待する結果):
        assert_eq!(
            bare,
            vec![ClientEventKind::JoinPost, ClientEventKind::LeavePost]
        );
    }

    #[test]
    fn test_channel_delivery_sorts_recipients() {
        // テスト項目: チャンネル宛て配信の宛先は ID 順に並ぶ
        // given (前提条件):
        let b = ConnectionId::try_from("b").unwrap();
        let a = ConnectionId::try_from("a").unwrap();
        let channel = ChannelId::Post(PostId::try_from("p1").unwrap());

        // when (操作):
        let delivery = Delivery::to_channel(
            channel,
            vec![b.clone(), a.clone()],
            OutboundEvent::server_error("x"),
        );

        // then (期待する結果):
        assert_eq!(delivery.recipients, vec![a.clone(), b]);
        assert!(delivery.reaches(&a));
    }
}
