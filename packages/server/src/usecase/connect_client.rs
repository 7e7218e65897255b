//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::authenticate() / execute() メソッド
//! - 認証結果の観測と、Registry・個人チャンネル・送信キューへの登録
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続が状態を一切残さないことを保証
//! - 同一ユーザーの複数タブ接続が全て個人チャンネルに入ることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - 異常系：トークンなし・不正なトークン
//! - エッジケース：同一ユーザーの2つ目の接続

use std::sync::Arc;

use crate::domain::{
    AuthError, ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, Identity,
    IdentityVerifier, JoinOutcome, MessagePusher, ObservedEvent, PusherChannel,
    RealtimeObserver,
};

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    verifier: Arc<dyn IdentityVerifier>,
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
    message_pusher: Arc<dyn MessagePusher>,
    observer: Arc<dyn RealtimeObserver>,
}

impl ConnectClientUseCase {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        registry: Arc<dyn ConnectionRegistry>,
        membership: Arc<dyn ChannelMembership>,
        message_pusher: Arc<dyn MessagePusher>,
        observer: Arc<dyn RealtimeObserver>,
    ) -> Self {
        Self {
            verifier,
            registry,
            membership,
            message_pusher,
            observer,
        }
    }

    /// ハンドシェイク時の資格情報を検証する
    ///
    /// 状態には一切触れない。失敗した場合、呼び出し側は接続を確立しない。
    pub fn authenticate(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        match self.verifier.verify(credential) {
            Ok(identity) => {
                self.observer.observe(ObservedEvent::AdmissionSucceeded {
                    user_id: identity.user_id.clone(),
                });
                Ok(identity)
            }
            Err(error) => {
                self.observer.observe(ObservedEvent::AdmissionFailed {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// 認証済みの接続を登録する
    ///
    /// # Arguments
    ///
    /// * `connection_id` - transport が採番した接続 ID
    /// * `identity` - `authenticate` が返した ID
    /// * `sender` - 接続の送信キュー
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        sender: PusherChannel,
    ) {
        let user_id = identity.user_id.clone();

        // 1. Registry に登録
        self.registry
            .register(connection_id.clone(), user_id.clone())
            .await;

        // 2. 送信キューを登録（以降の Delivery が届くように先に行う）
        self.message_pusher
            .register_connection(connection_id.clone(), sender)
            .await;

        // 3. 個人チャンネルに参加
        let channel = ChannelId::User(user_id.clone());
        let outcome = self
            .membership
            .join(channel.clone(), connection_id.clone())
            .await;
        self.observer.observe(ObservedEvent::ChannelJoined {
            user_id: user_id.clone(),
            connection_id: connection_id.clone(),
            channel,
            duplicate: outcome == JoinOutcome::AlreadyMember,
        });

        self.observer.observe(ObservedEvent::Connected {
            user_id,
            connection_id,
        });
    }
}
