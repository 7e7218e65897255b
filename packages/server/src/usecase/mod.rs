//! UseCase 層
//!
//! 各ユースケースは Domain のトレイト（Registry / Membership / Observer）だけに
//! 依存し、送信すべき内容を `Delivery` のリストとして返す。
//! ソケットへの書き込みは UI 層（transport adapter）が行う。

pub mod connect_client;
pub mod deliver_comment;
pub mod disconnect_client;
pub mod dispatch_notification;
pub mod error;
mod fan_out;
pub mod handle_client_event;
pub mod inspect_presence;
pub mod relay_signal;
pub mod track_presence;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_client::ConnectClientUseCase;
pub use deliver_comment::DeliverCommentUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use dispatch_notification::{DispatchNotificationUseCase, DispatchOutcome};
pub use error::RealtimeError;
pub use handle_client_event::HandleClientEventUseCase;
pub use inspect_presence::InspectPresenceUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use track_presence::TrackPresenceUseCase;
