//! UseCase: 閲覧プレゼンス
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - TrackPresenceUseCase::start() / end() / join_post() メソッド
//! - 閲覧開始・終了のブロードキャスト対象と、チャンネル状態の遷移
//!
//! ### なぜこのテストが必要か
//! - 閲覧者本人の接続にはエコーされないこと（接続単位の除外）
//! - start / end の回数がユーザーごとに 0 か 1 の差に収まること
//! - join:post / leave:post と混在しても二重の start / end が出ないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：2ユーザーが同じ投稿を閲覧
//! - エッジケース：同じ接続からの重複 start、閲覧していない接続の end
//! - 異常系：Registry に所有者がいない接続

use std::sync::Arc;

use crate::domain::{
    ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, Delivery, JoinOutcome,
    LeaveOutcome, ObservedEvent, OutboundEvent, PostId, PresenceAction, RealtimeObserver, UserId,
};

use super::{
    error::RealtimeError,
    fan_out::{fan_out, resolve_owner},
};

/// 投稿の閲覧開始・終了を扱うユースケース
pub struct TrackPresenceUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
    observer: Arc<dyn RealtimeObserver>,
}

impl TrackPresenceUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        membership: Arc<dyn ChannelMembership>,
        observer: Arc<dyn RealtimeObserver>,
    ) -> Self {
        Self {
            registry,
            membership,
            observer,
        }
    }

    /// 閲覧開始（`post:view:start`）
    ///
    /// 未閲覧 → 閲覧中 に遷移したときだけ、他のメンバーへ `start` を送る。
    /// 送信元の接続自身は宛先に含まれない。
    pub async fn start(
        &self,
        connection_id: &ConnectionId,
        post_id: PostId,
    ) -> Result<Vec<Delivery>, RealtimeError> {
        // 1. 所有ユーザーを解決
        let user_id = resolve_owner(self.registry.as_ref(), connection_id).await?;
        let channel = ChannelId::Post(post_id.clone());

        // 2. 投稿チャンネルに参加
        self.join_channel(&channel, connection_id, &user_id).await;

        // 3. 閲覧中に遷移した場合のみブロードキャスト
        if !self.membership.mark_viewing(&channel, connection_id).await {
            return Ok(Vec::new());
        }
        let event = OutboundEvent::PresenceUpdate {
            post_id,
            user_id,
            action: PresenceAction::Start,
        };
        let delivery = fan_out(
            self.membership.as_ref(),
            self.observer.as_ref(),
            channel,
            Some(connection_id),
            event,
        )
        .await?;

        Ok(vec![delivery])
    }

    /// 閲覧終了（`post:view:end` / `leave:post`）
    ///
    /// 閲覧中だった場合は宛先を確定してから退出する。
    /// メンバーでない接続からの終了は何もしない。
    pub async fn end(
        &self,
        connection_id: &ConnectionId,
        post_id: PostId,
    ) -> Result<Vec<Delivery>, RealtimeError> {
        let user_id = resolve_owner(self.registry.as_ref(), connection_id).await?;
        let channel = ChannelId::Post(post_id.clone());

        // 1. 退出前に宛先を確定
        let broadcast = if self.membership.is_viewing(&channel, connection_id).await {
            let event = OutboundEvent::PresenceUpdate {
                post_id,
                user_id: user_id.clone(),
                action: PresenceAction::End,
            };
            Some(
                fan_out(
                    self.membership.as_ref(),
                    self.observer.as_ref(),
                    channel.clone(),
                    Some(connection_id),
                    event,
                )
                .await,
            )
        } else {
            None
        };

        // 2. 退出（ブロードキャストの成否に関わらず）
        if let LeaveOutcome::Left { .. } = self.membership.leave(&channel, connection_id).await {
            self.observer.observe(ObservedEvent::ChannelLeft {
                user_id: Some(user_id),
                connection_id: connection_id.clone(),
                channel,
                on_disconnect: false,
            });
        }

        match broadcast {
            Some(delivery) => Ok(vec![delivery?]),
            None => Ok(Vec::new()),
        }
    }

    /// 投稿チャンネルの購読のみ（`join:post`）
    ///
    /// 閲覧中にはしないので presence は送らない。
    pub async fn join_post(
        &self,
        connection_id: &ConnectionId,
        post_id: PostId,
    ) -> Result<Vec<Delivery>, RealtimeError> {
        let user_id = resolve_owner(self.registry.as_ref(), connection_id).await?;
        self.join_channel(&ChannelId::Post(post_id), connection_id, &user_id)
            .await;
        Ok(Vec::new())
    }

    async fn join_channel(
        &self,
        channel: &ChannelId,
        connection_id: &ConnectionId,
        user_id: &UserId,
    ) {
        let outcome = self
            .membership
            .join(channel.clone(), connection_id.clone())
            .await;
        self.observer.observe(ObservedEvent::ChannelJoined {
            user_id: user_id.clone(),
            connection_id: connection_id.clone(),
            channel: channel.clone(),
            duplicate: outcome == JoinOutcome::AlreadyMember,
        });
    }
}
