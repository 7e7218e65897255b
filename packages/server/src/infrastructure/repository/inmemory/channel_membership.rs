//! インメモリ ChannelMembership 実装
//!
//! チャンネル → 参加者 と 接続 → チャンネル の 2 つの HashMap を
//! 1 つの Mutex で保護します。空になったエントリはその場で削除します。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChannelId, ChannelMembership, ConnectionId, JoinOutcome, LeaveOutcome, RepositoryError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscription {
    Listening,
    Viewing,
}

#[derive(Debug, Default)]
struct MembershipState {
    channel_members: HashMap<ChannelId, HashMap<ConnectionId, Subscription>>,
    connection_channels: HashMap<ConnectionId, HashSet<ChannelId>>,
}

/// インメモリのチャンネル所属管理
#[derive(Debug, Default)]
pub struct InMemoryChannelMembership {
    state: Mutex<MembershipState>,
}

impl InMemoryChannelMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of channels that currently have at least one member.
    pub async fn count_channels(&self) -> usize {
        let state = self.state.lock().await;
        state.channel_members.len()
    }
}

#[async_trait]
impl ChannelMembership for InMemoryChannelMembership {
    async fn join(&self, channel: ChannelId, connection_id: ConnectionId) -> JoinOutcome {
        let mut state = self.state.lock().await;

        let members = state.channel_members.entry(channel.clone()).or_default();
        if members.contains_key(&connection_id) {
            return JoinOutcome::AlreadyMember;
        }
        members.insert(connection_id.clone(), Subscription::Listening);

        state
            .connection_channels
            .entry(connection_id)
            .or_default()
            .insert(channel);

        JoinOutcome::Joined
    }

    async fn mark_viewing(&self, channel: &ChannelId, connection_id: &ConnectionId) -> bool {
        let mut state = self.state.lock().await;

        match state
            .channel_members
            .get_mut(channel)
            .and_then(|members| members.get_mut(connection_id))
        {
            Some(subscription) if *subscription == Subscription::Listening => {
                *subscription = Subscription::Viewing;
                true
            }
            _ => false,
        }
    }

    async fn is_viewing(&self, channel: &ChannelId, connection_id: &ConnectionId) -> bool {
        let state = self.state.lock().await;
        state
            .channel_members
            .get(channel)
            .and_then(|members| members.get(connection_id))
            .is_some_and(|subscription| *subscription == Subscription::Viewing)
    }

    async fn leave(&self, channel: &ChannelId, connection_id: &ConnectionId) -> LeaveOutcome {
        let mut state = self.state.lock().await;

        let Some(members) = state.channel_members.get_mut(channel) else {
            return LeaveOutcome::NotMember;
        };
        let Some(subscription) = members.remove(connection_id) else {
            return LeaveOutcome::NotMember;
        };
        if members.is_empty() {
            state.channel_members.remove(channel);
        }

        if let Some(channels) = state.connection_channels.get_mut(connection_id) {
            channels.remove(channel);
            if channels.is_empty() {
                state.connection_channels.remove(connection_id);
            }
        }

        LeaveOutcome::Left {
            was_viewing: subscription == Subscription::Viewing,
        }
    }

    async fn members_of(
        &self,
        channel: &ChannelId,
    ) -> Result<HashSet<ConnectionId>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .channel_members
            .get(channel)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn channels_of(&self, connection_id: &ConnectionId) -> HashSet<ChannelId> {
        let state = self.state.lock().await;
        state
            .connection_channels
            .get(connection_id)
            .cloned()
            .unwrap_or_default()
    }
}
