//! Domain layer: value objects, entities, events and the seams the use cases
//! depend on. Nothing in here knows about axum, serde_json or JWTs.

pub mod entity;
pub mod error;
pub mod event;
pub mod identity;
pub mod message_pusher;
pub mod observer;
pub mod repository;
pub mod value_object;

pub use entity::{CommentAuthor, CommentEvent, Identity, NotificationKind, NotificationRecord};
pub use error::{AuthError, MessagePushError, ProtocolError, RepositoryError, ValueObjectError};
pub use event::{
    ClientEventKind, Delivery, DeliveryTarget, InboundEvent, OutboundEvent, PresenceAction,
};
pub use identity::IdentityVerifier;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use observer::{ObservedEvent, ObservedLevel, RealtimeObserver};
pub use repository::{ChannelMembership, ConnectionRegistry, JoinOutcome, LeaveOutcome};
pub use value_object::{ChannelId, ConnectionId, PostId, Timestamp, UserId};
