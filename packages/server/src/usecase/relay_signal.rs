//! UseCase: 既読・入力中シグナルの中継
//!
//! 状態を持たない中継のみ。入力中表示のタイムアウトはクライアントが
//! `comment:typing:end` を送ることで行う。

use std::sync::Arc;

use postwatch_shared::time::Clock;

use crate::domain::{
    ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, Delivery, OutboundEvent,
    PostId, RealtimeObserver, Timestamp,
};

use super::{
    error::RealtimeError,
    fan_out::{fan_out, resolve_owner},
};

/// 既読通知・入力中表示を投稿チャンネルの他のメンバーへ中継するユースケース
pub struct RelaySignalUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
    observer: Arc<dyn RealtimeObserver>,
    clock: Arc<dyn Clock>,
}

impl RelaySignalUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        membership: Arc<dyn ChannelMembership>,
        observer: Arc<dyn RealtimeObserver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            membership,
            observer,
            clock,
        }
    }

    /// 既読通知（`post:read`）
    pub async fn notify_read(
        &self,
        connection_id: &ConnectionId,
        post_id: PostId,
    ) -> Result<Vec<Delivery>, RealtimeError> {
        let user_id = resolve_owner(self.registry.as_ref(), connection_id).await?;
        let event = OutboundEvent::ReadUpdate {
            post_id: post_id.clone(),
            user_id,
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        self.relay(connection_id, post_id, event).await
    }

    /// 入力中表示（`comment:typing:start` / `comment:typing:end`）
    pub async fn typing(
        &self,
        connection_id: &ConnectionId,
        post_id: PostId,
        is_typing: bool,
    ) -> Result<Vec<Delivery>, RealtimeError> {
        let user_id = resolve_owner(self.registry.as_ref(), connection_id).await?;
        let event = OutboundEvent::TypingUpdate {
            post_id: post_id.clone(),
            user_id,
            is_typing,
        };
        self.relay(connection_id, post_id, event).await
    }

    async fn relay(
        &self,
        connection_id: &ConnectionId,
        post_id: PostId,
        event: OutboundEvent,
    ) -> Result<Vec<Delivery>, RealtimeError> {
        let delivery = fan_out(
            self.membership.as_ref(),
            self.observer.as_ref(),
            ChannelId::Post(post_id),
            Some(connection_id),
            event,
        )
        .await?;
        Ok(vec![delivery])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChannelMembership, RepositoryError},
        usecase::test_support::{Stores, conn, post, received_by, user},
    };
    use postwatch_shared::time::FixedClock;

    fn create_usecase(stores: &Stores) -> RelaySignalUseCase {
        RelaySignalUseCase::new(
            stores.registry.clone(),
            stores.membership.clone(),
            stores.observer.clone(),
            Arc::new(FixedClock::new(1_672_531_200_000)),
        )
    }

    async fn view(stores: &Stores, connection_id: &str, post_id: &str) {
        let channel = ChannelId::Post(post(post_id));
        stores.membership.join(channel.clone(), conn(connection_id)).await;
        stores.membership.mark_viewing(&channel, &conn(connection_id)).await;
    }

    #[tokio::test]
    async fn test_read_receipt_reaches_other_viewers() {
        // テスト項目: 既読通知が送信元以外の閲覧者に時刻付きで届く
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        view(&stores, "a1", "p1").await;
        view(&stores, "b1", "p1").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase.notify_read(&conn("a1"), post("p1")).await.unwrap();

        // then (期待する結果):
        let expected = OutboundEvent::ReadUpdate {
            post_id: post("p1"),
            user_id: user("alice"),
            timestamp: Timestamp::new(1_672_531_200_000),
        };
        assert_eq!(received_by(&deliveries, "b1"), vec![&expected]);
        assert!(received_by(&deliveries, "a1").is_empty());
    }

    #[tokio::test]
    async fn test_typing_start_and_end_are_relayed() {
        // テスト項目: 入力開始・終了がそれぞれ isTyping true / false で中継される
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        view(&stores, "a1", "p1").await;
        view(&stores, "b1", "p1").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let started = usecase.typing(&conn("a1"), post("p1"), true).await.unwrap();
        let ended = usecase.typing(&conn("a1"), post("p1"), false).await.unwrap();

        // then (期待する結果):
        let typing = |is_typing| OutboundEvent::TypingUpdate {
            post_id: post("p1"),
            user_id: user("alice"),
            is_typing,
        };
        assert_eq!(received_by(&started, "b1"), vec![&typing(true)]);
        assert_eq!(received_by(&ended, "b1"), vec![&typing(false)]);
    }

    #[tokio::test]
    async fn test_signal_does_not_leak_to_other_posts() {
        // テスト項目: 別の投稿を見ている接続にはシグナルが届かない
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        view(&stores, "a1", "p1").await;
        view(&stores, "b1", "p2").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase.typing(&conn("a1"), post("p1"), true).await.unwrap();

        // then (期待する結果):
        assert!(received_by(&deliveries, "b1").is_empty());
    }

    #[tokio::test]
    async fn test_signal_from_unknown_connection_fails_locally() {
        // テスト項目: 所有者のいない接続からの既読通知はエラーになる
        // given (前提条件):
        let stores = Stores::new();
        let usecase = create_usecase(&stores);

        // when (操作):
        let result = usecase.notify_read(&conn("ghost"), post("p1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RealtimeError::UnknownConnection(_))));
    }

    #[tokio::test]
    async fn test_membership_failure_is_reported() {
        // テスト項目: メンバー取得の失敗は Membership エラーとして返る
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        let mut membership = crate::domain::repository::MockChannelMembership::new();
        membership
            .expect_members_of()
            .returning(|_| Err(RepositoryError::Unavailable("down".to_string())));
        let usecase = RelaySignalUseCase::new(
            stores.registry.clone(),
            Arc::new(membership),
            stores.observer.clone(),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let result = usecase.typing(&conn("a1"), post("p1"), true).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RealtimeError::Membership(RepositoryError::Unavailable(
                "down".to_string()
            )))
        );
    }
}
