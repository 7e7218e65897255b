//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::MessagePusher,
    usecase::{
        ConnectClientUseCase, DeliverCommentUseCase, DisconnectClientUseCase,
        DispatchNotificationUseCase, HandleClientEventUseCase, InspectPresenceUseCase,
    },
};

/// WebSocket heartbeat settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// サーバーから ping を送る間隔
    pub ping_interval: Duration,
    /// この時間フレームが届かない接続は切断する
    pub ping_timeout: Duration,
}

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（認証と接続登録）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（切断時のクリーンアップ）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// HandleClientEventUseCase（受信イベントの振り分け）
    pub handle_client_event_usecase: Arc<HandleClientEventUseCase>,
    /// DispatchNotificationUseCase（通知のライブ配信）
    pub dispatch_notification_usecase: Arc<DispatchNotificationUseCase>,
    /// DeliverCommentUseCase（新着コメントの配信）
    pub deliver_comment_usecase: Arc<DeliverCommentUseCase>,
    /// InspectPresenceUseCase（デバッグ用の参照）
    pub inspect_presence_usecase: Arc<InspectPresenceUseCase>,
    /// MessagePusher（Delivery をソケットへ書き込む）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// `/internal` ルートに要求する Bearer トークン
    pub internal_token: Option<String>,
    pub heartbeat: HeartbeatConfig,
}
