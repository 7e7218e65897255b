//! UseCase: 通知のライブ配信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DispatchNotificationUseCase::execute() メソッド
//! - 投稿に紐づく通知の抑制判定と、個人チャンネルへの配信
//!
//! ### なぜこのテストが必要か
//! - 投稿を見ている受信者には `notification:new` を送らないこと
//! - 判定に失敗した場合でも通知を落とさないこと（fail open）
//!
//! ### どのような状況を想定しているか
//! - 正常系：閲覧中の受信者は抑制、閲覧していない受信者には配信
//! - 異常系：メンバー取得の失敗、所有者のいないメンバー
//! - エッジケース：投稿に紐づかない種別、受信者がオフライン

use std::sync::Arc;

use crate::domain::{
    ChannelId, ChannelMembership, ConnectionRegistry, Delivery, NotificationRecord,
    ObservedEvent, OutboundEvent, PostId, RealtimeObserver, RepositoryError, UserId,
};

use super::fan_out::personal_recipients;

/// 配信判定の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 受信者が投稿を見ているため送らなかった
    Suppressed,
    /// 個人チャンネルへ送る
    Pushed(Delivery),
}

/// 永続化済みの通知をライブ配信するかどうか決めるユースケース
pub struct DispatchNotificationUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
    observer: Arc<dyn RealtimeObserver>,
}

impl DispatchNotificationUseCase {
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

    /// 通知を配信する
    ///
    /// 投稿に紐づく種別で、受信者がその投稿チャンネルにいる場合は抑制する。
    /// 判定に失敗した場合は配信する。
    pub async fn execute(&self, record: NotificationRecord) -> DispatchOutcome {
        let recipient = record.recipient.clone();

        // 1. 抑制判定
        if let Some(post_id) = record.scoped_post() {
            match self.recipient_is_present(&recipient, post_id).await {
                Ok(true) => {
                    self.observer.observe(ObservedEvent::NotificationSuppressed {
                        recipient,
                        post_id: post_id.clone(),
                    });
                    return DispatchOutcome::Suppressed;
                }
                Ok(false) => {}
                Err(error) => {
                    self.observer.observe(ObservedEvent::NotificationFailOpen {
                        recipient: recipient.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        // 2. 個人チャンネルへ配信
        let recipients = personal_recipients(
            self.registry.as_ref(),
            self.membership.as_ref(),
            &recipient,
        )
        .await;
        self.observer.observe(ObservedEvent::NotificationPushed {
            recipient: recipient.clone(),
            recipients: recipients.len(),
        });

        DispatchOutcome::Pushed(Delivery::to_channel(
            ChannelId::User(recipient),
            recipients,
            OutboundEvent::NotificationNew(record),
        ))
    }

    /// 受信者のいずれかの接続が投稿チャンネルのメンバーか
    async fn recipient_is_present(
        &self,
        recipient: &UserId,
        post_id: &PostId,
    ) -> Result<bool, RepositoryError> {
        let channel = ChannelId::Post(post_id.clone());
        let members = self.membership.members_of(&channel).await?;

        for connection_id in members {
            match self.registry.owner_of(&connection_id).await {
                Some(owner) if &owner == recipient => return Ok(true),
                Some(_) => {}
                // 所有者が引けないメンバーは非メンバー扱い
                None => self.observer.observe(ObservedEvent::MembershipInconsistency {
                    connection_id,
                    detail: format!("member of {channel} has no registered owner"),
                }),
            }
        }

        Ok(false)
    }
}
