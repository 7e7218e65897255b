//! UseCase: クライアントイベントの振り分け
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - HandleClientEventUseCase::execute() メソッド
//! - イベント種別ごとの振り分けと、エラー時の `socket:error` 応答
//!
//! ### なぜこのテストが必要か
//! - 不正なペイロードが送信元だけへのエラーで済み、他の状態を壊さないこと
//! - 未知のイベントは無視されること（接続は維持）
//!
//! ### どのような状況を想定しているか
//! - 正常系：view:start / read / typing の振り分け
//! - 異常系：JSON でないフレーム、postId の欠落、所有者のいない接続
//! - エッジケース：未知のイベント名

use std::sync::Arc;

use crate::domain::{
    ClientEventKind, ConnectionId, ConnectionRegistry, Delivery, InboundEvent, ObservedEvent,
    OutboundEvent, ProtocolError, RealtimeObserver,
};

use super::{RelaySignalUseCase, TrackPresenceUseCase, error::RealtimeError};

/// 非 JSON フレームへの応答メッセージ
const INVALID_FORMAT_MESSAGE: &str = "Invalid message format";

/// 1つの受信フレームを該当するユースケースへ振り分ける
pub struct HandleClientEventUseCase {
    presence: Arc<TrackPresenceUseCase>,
    signal: Arc<RelaySignalUseCase>,
    registry: Arc<dyn ConnectionRegistry>,
    observer: Arc<dyn RealtimeObserver>,
}

impl HandleClientEventUseCase {
    pub fn new(
        presence: Arc<TrackPresenceUseCase>,
        signal: Arc<RelaySignalUseCase>,
        registry: Arc<dyn ConnectionRegistry>,
        observer: Arc<dyn RealtimeObserver>,
    ) -> Self {
        Self {
            presence,
            signal,
            registry,
            observer,
        }
    }

    /// 受信イベントを処理し、送信すべき Delivery を返す
    ///
    /// エラーは送信元の接続宛ての `socket:error` に変換される。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        frame: Result<InboundEvent, ProtocolError>,
    ) -> Vec<Delivery> {
        let event = match frame {
            Ok(event) => event,
            Err(error) => return self.reject(connection_id, error).await,
        };

        let kind = event.kind;
        let result = match kind {
            ClientEventKind::JoinPost => self.presence.join_post(connection_id, event.post_id).await,
            ClientEventKind::ViewStart => self.presence.start(connection_id, event.post_id).await,
            ClientEventKind::LeavePost | ClientEventKind::ViewEnd => {
                self.presence.end(connection_id, event.post_id).await
            }
            ClientEventKind::Read => self.signal.notify_read(connection_id, event.post_id).await,
            ClientEventKind::TypingStart => {
                self.signal
                    .typing(connection_id, event.post_id, true)
                    .await
            }
            ClientEventKind::TypingEnd => {
                self.signal
                    .typing(connection_id, event.post_id, false)
                    .await
            }
        };

        match result {
            Ok(deliveries) => deliveries,
            Err(error) => self.fail(connection_id, kind, error).await,
        }
    }

    async fn reject(&self, connection_id: &ConnectionId, error: ProtocolError) -> Vec<Delivery> {
        let (event, reply) = match &error {
            // 未知のイベントはログのみ
            ProtocolError::UnknownEvent(name) => (name.clone(), None),
            ProtocolError::MalformedFrame(_) => ("message".to_string(), Some(INVALID_FORMAT_MESSAGE)),
            ProtocolError::InvalidPayload { kind, .. } => {
                (kind.name().to_string(), Some(kind.failure_message()))
            }
        };

        self.observer.observe(ObservedEvent::ProtocolViolation {
            user_id: self.registry.owner_of(connection_id).await,
            connection_id: connection_id.clone(),
            event,
            reason: error.to_string(),
        });

        reply
            .map(|message| {
                Delivery::to_connection(connection_id.clone(), OutboundEvent::server_error(message))
            })
            .into_iter()
            .collect()
    }

    async fn fail(
        &self,
        connection_id: &ConnectionId,
        kind: ClientEventKind,
        error: RealtimeError,
    ) -> Vec<Delivery> {
        self.observer.observe(ObservedEvent::ProtocolViolation {
            user_id: self.registry.owner_of(connection_id).await,
            connection_id: connection_id.clone(),
            event: kind.name().to_string(),
            reason: error.to_string(),
        });

        vec![Delivery::to_connection(
            connection_id.clone(),
            OutboundEvent::server_error(kind.failure_message()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChannelId, ChannelMembership, DeliveryTarget, PresenceAction},
        infrastructure::dto::conversion::parse_client_frame,
        usecase::test_support::{Stores, conn, post, received_by, user},
    };
    use postwatch_shared::time::FixedClock;

    fn create_usecase(stores: &Stores) -> HandleClientEventUseCase {
        let presence = Arc::new(TrackPresenceUseCase::new(
            stores.registry.clone(),
            stores.membership.clone(),
            stores.observer.clone(),
        ));
        let signal = Arc::new(RelaySignalUseCase::new(
            stores.registry.clone(),
            stores.membership.clone(),
            stores.observer.clone(),
            Arc::new(FixedClock::new(0)),
        ));
        HandleClientEventUseCase::new(
            presence,
            signal,
            stores.registry.clone(),
            stores.observer.clone(),
        )
    }

    fn server_error_to(connection_id: &str, message: &str) -> Vec<Delivery> {
        vec![Delivery::to_connection(
            conn(connection_id),
            OutboundEvent::server_error(message),
        )]
    }

    #[tokio::test]
    async fn test_view_start_frame_is_routed_to_presence() {
        // テスト項目: post:view:start のフレームが presence の start として処理される
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        let usecase = create_usecase(&stores);
        let frame = r#"{"event":"post:view:start","data":{"postId":"p1"}}"#;
        usecase.execute(&conn("b1"), parse_client_frame(frame)).await;

        // when (操作):
        let deliveries = usecase.execute(&conn("a1"), parse_client_frame(frame)).await;

        // then (期待する結果):
        assert_eq!(
            received_by(&deliveries, "b1"),
            vec![&OutboundEvent::PresenceUpdate {
                post_id: post("p1"),
                user_id: user("alice"),
                action: PresenceAction::Start,
            }]
        );
    }

    #[tokio::test]
    async fn test_leave_post_behaves_as_view_end() {
        // テスト項目: leave:post が閲覧終了として扱われる
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        stores.admit("b1", "bob").await;
        let usecase = create_usecase(&stores);
        let start = r#"{"event":"post:view:start","data":{"postId":"p1"}}"#;
        usecase.execute(&conn("a1"), parse_client_frame(start)).await;
        usecase.execute(&conn("b1"), parse_client_frame(start)).await;

        // when (操作):
        let deliveries = usecase
            .execute(
                &conn("a1"),
                parse_client_frame(r#"{"event":"leave:post","data":"p1"}"#),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(
            received_by(&deliveries, "b1").as_slice(),
            [OutboundEvent::PresenceUpdate {
                action: PresenceAction::End,
                ..
            }]
        ));
        assert!(
            !stores
                .membership
                .channels_of(&conn("a1"))
                .await
                .contains(&ChannelId::Post(post("p1")))
        );
    }

    #[tokio::test]
    async fn test_invalid_payload_answers_only_the_sender() {
        // テスト項目: postId の欠落は送信元だけに socket:error を返し、状態を変えない
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        let usecase = create_usecase(&stores);
        let channels_before = stores.membership.count_channels().await;

        // when (操作):
        let deliveries = usecase
            .execute(
                &conn("a1"),
                parse_client_frame(r#"{"event":"post:view:start","data":{}}"#),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            deliveries,
            server_error_to("a1", "Failed to start post view")
        );
        assert_eq!(deliveries[0].target, DeliveryTarget::Connection(conn("a1")));
        assert_eq!(stores.membership.count_channels().await, channels_before);
        assert_eq!(stores.observer.names(), vec!["socket:protocol:error"]);
    }

    #[tokio::test]
    async fn test_malformed_frame_answers_invalid_format() {
        // テスト項目: JSON でないフレームには "Invalid message format" を返す
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(&conn("a1"), parse_client_frame("not json"))
            .await;

        // then (期待する結果):
        assert_eq!(deliveries, server_error_to("a1", "Invalid message format"));
    }

    #[tokio::test]
    async fn test_unknown_event_is_logged_and_ignored() {
        // テスト項目: 未知のイベントは応答せずログのみ
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("a1", "alice").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(
                &conn("a1"),
                parse_client_frame(r#"{"event":"post:delete","data":{"postId":"p1"}}"#),
            )
            .await;

        // then (期待する結果):
        assert!(deliveries.is_empty());
        assert!(matches!(
            stores.observer.events().as_slice(),
            [ObservedEvent::ProtocolViolation { event, .. }] if event == "post:delete"
        ));
    }

    #[tokio::test]
    async fn test_unknown_connection_gets_event_failure_message() {
        // テスト項目: 所有者のいない接続からの typing はイベント固有のエラーになる
        // given (前提条件):
        let stores = Stores::new();
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(
                &conn("ghost"),
                parse_client_frame(r#"{"event":"comment:typing:start","data":{"postId":"p1"}}"#),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            deliveries,
            server_error_to("ghost", "Failed to start typing indicator")
        );
    }
}
