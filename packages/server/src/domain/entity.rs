//! Entities handled by the realtime layer.
//!
//! Notification records and comments are owned by the REST side; this layer
//! only receives them after they were persisted and decides who sees them live.

use super::value_object::{PostId, Timestamp, UserId};

/// Identity yielded by a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: String,
}

impl Identity {
    pub fn new(user_id: UserId, role: String) -> Self {
        Self { user_id, role }
    }
}

/// Notification kinds known to the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    QuestionAnswer,
    Comment,
    Like,
    FriendRequest,
    Announcement,
    QuestionComment,
    Reply,
    Mention,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::QuestionAnswer => "question_answer",
            NotificationKind::Comment => "comment",
            NotificationKind::Like => "like",
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::Announcement => "announcement",
            NotificationKind::QuestionComment => "question_comment",
            NotificationKind::Reply => "reply",
            NotificationKind::Mention => "mention",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "question_answer" => Some(NotificationKind::QuestionAnswer),
            "comment" => Some(NotificationKind::Comment),
            "like" => Some(NotificationKind::Like),
            "friend_request" => Some(NotificationKind::FriendRequest),
            "announcement" => Some(NotificationKind::Announcement),
            "question_comment" => Some(NotificationKind::QuestionComment),
            "reply" => Some(NotificationKind::Reply),
            "mention" => Some(NotificationKind::Mention),
            _ => None,
        }
    }

    /// Kinds whose content a live viewer of the post already sees arrive
    /// through the post channel.
    pub fn is_resource_scoped(&self) -> bool {
        matches!(
            self,
            NotificationKind::Comment
                | NotificationKind::Reply
                | NotificationKind::QuestionAnswer
                | NotificationKind::QuestionComment
        )
    }
}

/// A notification that has already been durably stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub id: String,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub related_post: Option<PostId>,
    pub related_user: Option<UserId>,
    pub related_comment: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
}

impl NotificationRecord {
    /// The post whose channel decides suppression, if any.
    pub fn scoped_post(&self) -> Option<&PostId> {
        if self.kind.is_resource_scoped() {
            self.related_post.as_ref()
        } else {
            None
        }
    }
}

/// Public profile of a comment author as shown next to the comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    pub user_id: UserId,
    pub nickname: String,
    pub login_id: String,
    pub role: String,
}

/// A comment or reply that was just created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEvent {
    pub post_id: PostId,
    pub comment_id: String,
    pub parent_comment_id: Option<String>,
    pub author: CommentAuthor,
    pub content: String,
    pub created_at: Timestamp,
    /// Author of the post, used for the personal-channel copy.
    pub post_author_id: Option<UserId>,
    /// Author of the parent comment when this is a reply.
    pub parent_comment_author_id: Option<UserId>,
}

impl CommentEvent {
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: NotificationKind, related_post: Option<&str>) -> NotificationRecord {
        NotificationRecord {
            id: "n1".to_string(),
            recipient: UserId::try_from("u1").unwrap(),
            kind,
            related_post: related_post.map(|p| PostId::try_from(p).unwrap()),
            related_user: None,
            related_comment: None,
            message: "hello".to_string(),
            read: false,
            created_at: Timestamp::new(0),
        }
    }

    #[test]
    fn test_notification_kind_round_trips_names() {
        // テスト項目: 全ての種別が文字列との相互変換で一致する
        // given (前提条件):
        let kinds = [
            NotificationKind::QuestionAnswer,
            NotificationKind::Comment,
            NotificationKind::Like,
            NotificationKind::FriendRequest,
            NotificationKind::Announcement,
            NotificationKind::QuestionComment,
            NotificationKind::Reply,
            NotificationKind::Mention,
        ];

        // when (操作) / then (期待する結果):
        for kind in kinds {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("poke"), None);
    }

    #[test]
    fn test_scoped_post_requires_kind_and_post() {
        // テスト項目: 投稿に紐づく種別かつ投稿 ID がある場合のみ抑制対象になる
        // given (前提条件):
        let comment = record(NotificationKind::Comment, Some("p1"));
        let like = record(NotificationKind::Like, Some("p1"));
        let reply_without_post = record(NotificationKind::Reply, None);

        // when (操作) / then (期待する結果):
        assert_eq!(comment.scoped_post().map(PostId::as_str), Some("p1"));
        assert_eq!(like.scoped_post(), None);
        assert_eq!(reply_without_post.scoped_post(), None);
    }
}
