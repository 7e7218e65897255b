//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 閲覧中だった投稿ごとの `end` 合成と、全チャンネル・Registry からの削除
//!
//! ### なぜこのテストが必要か
//! - 切断理由に関わらずクリーンアップが最後まで走ることを保証
//! - 閲覧中の投稿ごとにちょうど1回 `end` が出ることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：2つの投稿を閲覧中の接続が切断
//! - エッジケース：同じユーザーの別タブが残る、join:post のみの購読
//! - 異常系：メンバー取得の失敗、Registry にない接続

use std::sync::Arc;

use crate::domain::{
    ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, Delivery, LeaveOutcome,
    MessagePusher, ObservedEvent, OutboundEvent, PresenceAction, RealtimeObserver,
};

use super::fan_out::fan_out;

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
    message_pusher: Arc<dyn MessagePusher>,
    observer: Arc<dyn RealtimeObserver>,
}

impl DisconnectClientUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        membership: Arc<dyn ChannelMembership>,
        message_pusher: Arc<dyn MessagePusher>,
        observer: Arc<dyn RealtimeObserver>,
    ) -> Self {
        Self {
            registry,
            membership,
            message_pusher,
            observer,
        }
    }

    /// 切断時のクリーンアップを実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 切断した接続
    /// * `reason` - ログ用の切断理由
    ///
    /// # Returns
    ///
    /// 閲覧中だった投稿ごとの `end` の Delivery（残りのメンバー宛て）
    pub async fn execute(&self, connection_id: &ConnectionId, reason: &str) -> Vec<Delivery> {
        // 1. 所有ユーザーを解決（見つからなくてもクリーンアップは続ける）
        let owner = self.registry.owner_of(connection_id).await;
        if owner.is_none() {
            self.observer.observe(ObservedEvent::MembershipInconsistency {
                connection_id: connection_id.clone(),
                detail: "disconnecting connection has no registered owner".to_string(),
            });
        }

        // 2. 参加中の全チャンネルから抜ける（投稿チャンネルは end を合成）
        let mut channels: Vec<ChannelId> = self
            .membership
            .channels_of(connection_id)
            .await
            .into_iter()
            .collect();
        channels.sort();

        let mut deliveries = Vec::new();
        let channels_left = channels.len();
        for channel in channels {
            if let (Some(post_id), Some(user_id)) = (channel.post_id(), owner.as_ref()) {
                if self.membership.is_viewing(&channel, connection_id).await {
                    let event = OutboundEvent::PresenceUpdate {
                        post_id: post_id.clone(),
                        user_id: user_id.clone(),
                        action: PresenceAction::End,
                    };
                    match fan_out(
                        self.membership.as_ref(),
                        self.observer.as_ref(),
                        channel.clone(),
                        Some(connection_id),
                        event,
                    )
                    .await
                    {
                        Ok(delivery) => deliveries.push(delivery),
                        Err(error) => {
                            self.observer.observe(ObservedEvent::MembershipInconsistency {
                                connection_id: connection_id.clone(),
                                detail: format!("end for {channel} not broadcast: {error}"),
                            });
                        }
                    }
                }
            }

            let left = self.membership.leave(&channel, connection_id).await;
            if channel.is_post() && matches!(left, LeaveOutcome::Left { .. }) {
                self.observer.observe(ObservedEvent::ChannelLeft {
                    user_id: owner.clone(),
                    connection_id: connection_id.clone(),
                    channel,
                    on_disconnect: true,
                });
            }
        }

        // 3. Registry から削除
        if let Some(user_id) = owner.as_ref() {
            self.registry.unregister(connection_id, user_id).await;
        }

        // 4. 送信キューを削除
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        self.observer.observe(ObservedEvent::Disconnected {
            user_id: owner,
            connection_id: connection_id.clone(),
            channels_left,
            reason: reason.to_string(),
        });

        deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RepositoryError, repository::MockChannelMembership},
        infrastructure::message_pusher::WebSocketMessagePusher,
        usecase::{
            TrackPresenceUseCase,
            test_support::{Stores, conn, post, received_by, user},
        },
    };

    fn create_usecase(stores: &Stores) -> (DisconnectClientUseCase, Arc<WebSocketMessagePusher>) {
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DisconnectClientUseCase::new(
            stores.registry.clone(),
            stores.membership.clone(),
            pusher.clone(),
            stores.observer.clone(),
        );
        (usecase, pusher)
    }

    fn create_presence(stores: &Stores) -> TrackPresenceUseCase {
        TrackPresenceUseCase::new(
            stores.registry.clone(),
            stores.membership.clone(),
            stores.observer.clone(),
        )
    }

    fn end_of(post_id: &str, user_id: &str) -> OutboundEvent {
        OutboundEvent::PresenceUpdate {
            post_id: post(post_id),
            user_id: user(user_id),
            action: PresenceAction::End,
        }
    }

    #[tokio::test]
    async fn test_disconnect_synthesizes_end_per_viewed_post() {
        // テスト項目: 2つの投稿を閲覧中の切断で、各投稿の閲覧者に end が1回ずつ届く
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        stores.admit("c1", "carol").await;
        let presence = create_presence(&stores);
        presence.start(&conn("b1"), post("p1")).await.unwrap();
        presence.start(&conn("c1"), post("p2")).await.unwrap();
        presence.start(&conn("a1"), post("p1")).await.unwrap();
        presence.start(&conn("a1"), post("p2")).await.unwrap();
        let (usecase, _pusher) = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase.execute(&conn("a1"), "transport closed").await;

        // then (期待する結果):
        assert_eq!(received_by(&deliveries, "b1"), vec![&end_of("p1", "alice")]);
        assert_eq!(received_by(&deliveries, "c1"), vec![&end_of("p2", "alice")]);
        assert!(received_by(&deliveries, "a1").is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_cleans_every_trace() {
        // テスト項目: 切断後はチャンネル・Registry・送信キューのどこにも接続が残らない
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        let presence = create_presence(&stores);
        presence.start(&conn("a1"), post("p1")).await.unwrap();
        presence.join_post(&conn("a1"), post("p2")).await.unwrap();
        let (usecase, pusher) = create_usecase(&stores);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        pusher.register_connection(conn("a1"), tx).await;

        // when (操作):
        usecase.execute(&conn("a1"), "heartbeat timeout").await;

        // then (期待する結果):
        assert!(stores.membership.channels_of(&conn("a1")).await.is_empty());
        assert!(stores.registry.active_connections(&user("alice")).await.is_empty());
        assert_eq!(stores.registry.owner_of(&conn("a1")).await, None);
        assert_eq!(stores.membership.count_channels().await, 0);
        assert_eq!(pusher.count_connections().await, 0);
        assert_eq!(
            stores.observer.events().last(),
            Some(&ObservedEvent::Disconnected {
                user_id: Some(user("alice")),
                connection_id: conn("a1"),
                channels_left: 3,
                reason: "heartbeat timeout".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_listener_only_disconnect_sends_no_end() {
        // テスト項目: join:post だけの購読は切断しても end を出さない
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        let presence = create_presence(&stores);
        presence.start(&conn("b1"), post("p1")).await.unwrap();
        presence.join_post(&conn("a1"), post("p1")).await.unwrap();
        let (usecase, _pusher) = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase.execute(&conn("a1"), "client closed").await;

        // then (期待する結果):
        assert!(deliveries.is_empty());
        assert!(
            stores.observer.names().contains(&"socket:leave:post:disconnect")
        );
    }

    #[tokio::test]
    async fn test_other_tab_keeps_user_registered() {
        // テスト項目: 同じユーザーの別タブが残っていればユーザーは Registry に残る
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("a2", "alice").await;
        let (usecase, _pusher) = create_usecase(&stores);

        // when (操作):
        usecase.execute(&conn("a1"), "client closed").await;

        // then (期待する結果):
        let active = stores.registry.active_connections(&user("alice")).await;
        assert_eq!(active.len(), 1);
        assert!(active.contains(&conn("a2")));
    }

    #[tokio::test]
    async fn test_cleanup_completes_when_membership_query_fails() {
        // テスト項目: メンバー取得に失敗しても退出と登録解除は完了する
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        let mut membership = MockChannelMembership::new();
        membership
            .expect_channels_of()
            .returning(|_| [ChannelId::Post(post("p1"))].into_iter().collect());
        membership.expect_is_viewing().returning(|_, _| true);
        membership
            .expect_members_of()
            .returning(|_| Err(RepositoryError::Unavailable("down".to_string())));
        membership
            .expect_leave()
            .times(1)
            .returning(|_, _| LeaveOutcome::Left { was_viewing: true });
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DisconnectClientUseCase::new(
            stores.registry.clone(),
            Arc::new(membership),
            pusher,
            stores.observer.clone(),
        );

        // when (操作):
        let deliveries = usecase.execute(&conn("a1"), "transport error").await;

        // then (期待する結果):
        assert!(deliveries.is_empty());
        assert_eq!(stores.registry.owner_of(&conn("a1")).await, None);
        assert!(
            stores
                .observer
                .names()
                .contains(&"socket:membership:inconsistent")
        );
    }
}
