//! MessagePusher trait 定義
//!
//! 接続ごとの送信キューへの書き込みを抽象化します。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Outbound queue of one connection. Serialized frames are pushed here and
/// drained by the connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Message pusher trait
///
/// UseCase 層から見た「接続へ送る」操作のインターフェース。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信キューを削除
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 特定の接続へ送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へ送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
