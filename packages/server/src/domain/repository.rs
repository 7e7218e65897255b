//! Repository trait 定義
//!
//! 接続レジストリとチャンネル所属のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Both stores are process-wide and in-memory. Each implementation must keep
//! its forward and reverse maps consistent under concurrent callers.

use std::collections::HashSet;

use async_trait::async_trait;

use super::{
    error::RepositoryError,
    value_object::{ChannelId, ConnectionId, UserId},
};

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

/// Result of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left { was_viewing: bool },
    NotMember,
}

/// Live connections per user, plus the reverse lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を利用者に紐づける（同じ組の再登録は何もしない）
    async fn register(&self, connection_id: ConnectionId, user_id: UserId);

    /// 接続の紐づけを解除する。最後の接続なら利用者のエントリも消える。
    ///
    /// Returns `false` when the pair was not registered.
    async fn unregister(&self, connection_id: &ConnectionId, user_id: &UserId) -> bool;

    /// 利用者の接続一覧（未知の利用者は空）
    async fn active_connections(&self, user_id: &UserId) -> HashSet<ConnectionId>;

    /// 接続の所有者
    async fn owner_of(&self, connection_id: &ConnectionId) -> Option<UserId>;

    /// 接続中の利用者数
    async fn count_users(&self) -> usize;
}

/// Channel subscriptions per connection.
///
/// Post-channel members additionally carry a viewing flag: a connection that
/// joined through `join:post` listens without being a viewer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelMembership: Send + Sync {
    /// チャンネルに参加する。既に参加済みなら `AlreadyMember`。
    async fn join(&self, channel: ChannelId, connection_id: ConnectionId) -> JoinOutcome;

    /// 参加済みの接続を閲覧中にする。状態が変わった場合のみ `true`。
    async fn mark_viewing(&self, channel: &ChannelId, connection_id: &ConnectionId) -> bool;

    /// 閲覧中かどうか
    async fn is_viewing(&self, channel: &ChannelId, connection_id: &ConnectionId) -> bool;

    /// チャンネルから抜ける（未参加なら何もしない）
    async fn leave(&self, channel: &ChannelId, connection_id: &ConnectionId) -> LeaveOutcome;

    /// チャンネルの参加者（存在しないチャンネルは空）
    async fn members_of(
        &self,
        channel: &ChannelId,
    ) -> Result<HashSet<ConnectionId>, RepositoryError>;

    /// 接続が参加しているチャンネル一覧
    async fn channels_of(&self, connection_id: &ConnectionId) -> HashSet<ChannelId>;
}
