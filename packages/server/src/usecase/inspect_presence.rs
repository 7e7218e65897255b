//! UseCase: プレゼンス状態の参照（デバッグ用）

use std::{collections::BTreeSet, sync::Arc};

use crate::domain::{ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, PostId, UserId};

/// 接続・閲覧者の一覧を返す読み取り専用のユースケース
///
/// 未知の ID には空の一覧を返す。
pub struct InspectPresenceUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
}

impl InspectPresenceUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        membership: Arc<dyn ChannelMembership>,
    ) -> Self {
        Self {
            registry,
            membership,
        }
    }

    /// ユーザーの接続 ID 一覧（ソート済み）
    pub async fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let mut connections: Vec<ConnectionId> = self
            .registry
            .active_connections(user_id)
            .await
            .into_iter()
            .collect();
        connections.sort();
        connections
    }

    /// 投稿チャンネルにいるユーザーの一覧（重複なし、ソート済み）
    pub async fn viewers_of(&self, post_id: &PostId) -> Vec<UserId> {
        let members = self
            .membership
            .members_of(&ChannelId::Post(post_id.clone()))
            .await
            .unwrap_or_default();

        let mut viewers = BTreeSet::new();
        for connection_id in members {
            if let Some(owner) = self.registry.owner_of(&connection_id).await {
                viewers.insert(owner);
            }
        }
        viewers.into_iter().collect()
    }

    /// 接続中のユーザー数
    pub async fn count_users(&self) -> usize {
        self.registry.count_users().await
    }
}
