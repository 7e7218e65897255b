//! UseCase: 新着コメント・返信の配信
//!
//! コメント本体の配信は通知の抑制判定とは独立しており、抑制されない。

use std::sync::Arc;

use crate::domain::{
    ChannelId, ChannelMembership, CommentEvent, ConnectionRegistry, Delivery, OutboundEvent,
    RealtimeObserver, UserId,
};

use super::{
    error::RealtimeError,
    fan_out::{fan_out, personal_recipients},
};

/// 作成されたコメントを関係者の個人チャンネルと投稿チャンネルへ配るユースケース
pub struct DeliverCommentUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    membership: Arc<dyn ChannelMembership>,
    observer: Arc<dyn RealtimeObserver>,
}

impl DeliverCommentUseCase {
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

    /// 配信先を決めて Delivery を返す
    ///
    /// - 返信: 親コメントの作成者、投稿者（返信者・親コメント作成者以外の場合）、投稿チャンネル
    /// - コメント: 投稿者（コメント者以外の場合）、投稿チャンネル
    ///
    /// 個人チャンネルと投稿チャンネルは別々に配信されるため、両方にいる接続は2回受け取る。
    pub async fn execute(&self, comment: CommentEvent) -> Result<Vec<Delivery>, RealtimeError> {
        let writer = &comment.author.user_id;
        let post_author = comment.post_author_id.as_ref();

        // 1. 個人チャンネルの宛先ユーザー
        let mut users: Vec<&UserId> = Vec::new();
        if comment.is_reply() {
            let parent_author = comment.parent_comment_author_id.as_ref();
            users.extend(parent_author);
            if let Some(author) = post_author {
                if author != writer && Some(author) != parent_author {
                    users.push(author);
                }
            }
        } else if let Some(author) = post_author.filter(|author| *author != writer) {
            users.push(author);
        }
        let users: Vec<UserId> = users.into_iter().cloned().collect();

        let event = if comment.is_reply() {
            OutboundEvent::ReplyNew(comment.clone())
        } else {
            OutboundEvent::CommentNew(comment.clone())
        };

        let mut deliveries = Vec::with_capacity(users.len() + 1);
        for user_id in users {
            let recipients =
                personal_recipients(self.registry.as_ref(), self.membership.as_ref(), &user_id)
                    .await;
            deliveries.push(Delivery::to_channel(
                ChannelId::User(user_id),
                recipients,
                event.clone(),
            ));
        }

        // 2. 投稿チャンネル（送信元の接続はないので除外なし）
        deliveries.push(
            fan_out(
                self.membership.as_ref(),
                self.observer.as_ref(),
                ChannelId::Post(comment.post_id),
                None,
                event,
            )
            .await?,
        );

        Ok(deliveries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{CommentAuthor, Timestamp},
        usecase::test_support::{Stores, conn, post, received_by, user},
    };

    fn comment(writer: &str, post_author: &str, parent_author: Option<&str>) -> CommentEvent {
        CommentEvent {
            post_id: post("p1"),
            comment_id: "c2".to_string(),
            parent_comment_id: parent_author.map(|_| "c1".to_string()),
            author: CommentAuthor {
                user_id: user(writer),
                nickname: writer.to_string(),
                login_id: writer.to_string(),
                role: "student".to_string(),
            },
            content: "hello".to_string(),
            created_at: Timestamp::new(0),
            post_author_id: Some(user(post_author)),
            parent_comment_author_id: parent_author.map(user),
        }
    }

    fn create_usecase(stores: &Stores) -> DeliverCommentUseCase {
        DeliverCommentUseCase::new(
            stores.registry.clone(),
            stores.membership.clone(),
            stores.observer.clone(),
        )
    }

    async fn view(stores: &Stores, connection_id: &str, post_id: &str) {
        let channel = ChannelId::Post(post(post_id));
        stores.membership.join(channel.clone(), conn(connection_id)).await;
        stores.membership.mark_viewing(&channel, &conn(connection_id)).await;
    }

    #[tokio::test]
    async fn test_comment_reaches_viewers_and_post_author() {
        // テスト項目: コメントは閲覧者（投稿チャンネル）と投稿者（個人チャンネル）に届く
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("w1", "writer").await;
        stores.admit("v1", "viewer").await;
        stores.admit("o1", "owner").await;
        view(&stores, "w1", "p1").await;
        view(&stores, "v1", "p1").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(comment("writer", "owner", None))
            .await
            .unwrap();

        // then (期待する結果):
        let expected = OutboundEvent::CommentNew(comment("writer", "owner", None));
        assert_eq!(received_by(&deliveries, "v1"), vec![&expected]);
        assert_eq!(received_by(&deliveries, "o1"), vec![&expected]);
        assert_eq!(received_by(&deliveries, "w1"), vec![&expected]);
    }

    #[tokio::test]
    async fn test_own_post_comment_skips_personal_channel() {
        // テスト項目: 自分の投稿へのコメントは個人チャンネルに送らない
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("o1", "owner").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(comment("owner", "owner", None))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(deliveries.len(), 1);
        assert_eq!(
            deliveries[0].target,
            crate::domain::DeliveryTarget::Channel(ChannelId::Post(post("p1")))
        );
    }

    #[tokio::test]
    async fn test_reply_reaches_parent_author_and_post_author() {
        // テスト項目: 返信は親コメント作成者と投稿者に reply:new として届く
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("r1", "replier").await;
        stores.admit("pa1", "parent").await;
        stores.admit("o1", "owner").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(comment("replier", "owner", Some("parent")))
            .await
            .unwrap();

        // then (期待する結果):
        let expected = OutboundEvent::ReplyNew(comment("replier", "owner", Some("parent")));
        assert_eq!(received_by(&deliveries, "pa1"), vec![&expected]);
        assert_eq!(received_by(&deliveries, "o1"), vec![&expected]);
        assert!(received_by(&deliveries, "r1").is_empty());
    }

    #[tokio::test]
    async fn test_reply_to_post_author_is_sent_once() {
        // テスト項目: 親コメント作成者が投稿者でもある場合、個人チャンネルには1回だけ届く
        // given (前提条件):
        let stores = Stores::new();
        stores.admit("o1", "owner").await;
        stores.admit("r1", "replier").await;
        let usecase = create_usecase(&stores);

        // when (操作):
        let deliveries = usecase
            .execute(comment("replier", "owner", Some("owner")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(received_by(&deliveries, "o1").len(), 1);
        assert_eq!(deliveries.len(), 2);
    }
}
