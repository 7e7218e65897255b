//! Helpers shared by the broadcasting use cases.

use crate::domain::{
    ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, Delivery, ObservedEvent,
    OutboundEvent, RealtimeObserver, RepositoryError, UserId,
};

use super::error::RealtimeError;

/// 接続の所有ユーザーを解決する
pub(crate) async fn resolve_owner(
    registry: &dyn ConnectionRegistry,
    connection_id: &ConnectionId,
) -> Result<UserId, RealtimeError> {
    registry
        .owner_of(connection_id)
        .await
        .ok_or_else(|| RealtimeError::UnknownConnection(connection_id.to_string()))
}

/// チャンネルの現メンバー（`origin` を除く）宛ての Delivery を組み立てる
///
/// 宛先はこの時点のメンバーで確定する。
pub(crate) async fn fan_out(
    membership: &dyn ChannelMembership,
    observer: &dyn RealtimeObserver,
    channel: ChannelId,
    origin: Option<&ConnectionId>,
    event: OutboundEvent,
) -> Result<Delivery, RepositoryError> {
    let recipients: Vec<ConnectionId> = membership
        .members_of(&channel)
        .await?
        .into_iter()
        .filter(|member| Some(member) != origin)
        .collect();

    observer.observe(ObservedEvent::Broadcast {
        event: event.name(),
        channel: channel.clone(),
        origin: origin.cloned(),
        recipients: recipients.len(),
    });

    Ok(Delivery::to_channel(channel, recipients, event))
}

/// 個人チャンネルの宛先を解決する
///
/// メンバーシップが引けない場合は Registry の接続一覧で代用する。
pub(crate) async fn personal_recipients(
    registry: &dyn ConnectionRegistry,
    membership: &dyn ChannelMembership,
    user_id: &UserId,
) -> Vec<ConnectionId> {
    match membership.members_of(&ChannelId::User(user_id.clone())).await {
        Ok(members) => members.into_iter().collect(),
        Err(_) => registry
            .active_connections(user_id)
            .await
            .into_iter()
            .collect(),
    }
}
