//! インメモリ ConnectionRegistry 実装
//!
//! 利用者 → 接続集合 と 接続 → 利用者 の 2 つの HashMap を
//! 1 つの Mutex で保護し、常に同時に更新します。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, UserId};

#[derive(Debug, Default)]
struct RegistryState {
    /// Key: user, Value: live connections of that user (never empty)
    user_connections: HashMap<UserId, HashSet<ConnectionId>>,
    /// Key: connection, Value: owner
    connection_owner: HashMap<ConnectionId, UserId>,
}

impl RegistryState {
    fn detach(&mut self, connection_id: &ConnectionId, user_id: &UserId) -> bool {
        let Some(connections) = self.user_connections.get_mut(user_id) else {
            return false;
        };
        let removed = connections.remove(connection_id);
        if connections.is_empty() {
            self.user_connections.remove(user_id);
        }
        removed
    }
}

/// インメモリ接続レジストリ
#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection_id: ConnectionId, user_id: UserId) {
        let mut state = self.state.lock().await;

        // A connection has exactly one owner; re-registering moves it.
        if let Some(previous) = state.connection_owner.get(&connection_id).cloned() {
            if previous != user_id {
                state.detach(&connection_id, &previous);
            }
        }

        state
            .user_connections
            .entry(user_id.clone())
            .or_default()
            .insert(connection_id.clone());
        state.connection_owner.insert(connection_id, user_id);
    }

    async fn unregister(&self, connection_id: &ConnectionId, user_id: &UserId) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.detach(connection_id, user_id);

        if state.connection_owner.get(connection_id) == Some(user_id) {
            state.connection_owner.remove(connection_id);
        } else if removed {
            tracing::error!(
                connection_id = %connection_id,
                user_id = %user_id,
                "Reverse lookup disagreed with the user's connection set"
            );
        }

        removed
    }

    async fn active_connections(&self, user_id: &UserId) -> HashSet<ConnectionId> {
        let state = self.state.lock().await;
        state
            .user_connections
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn owner_of(&self, connection_id: &ConnectionId) -> Option<UserId> {
        let state = self.state.lock().await;
        state.connection_owner.get(connection_id).cloned()
    }

    async fn count_users(&self) -> usize {
        let state = self.state.lock().await;
        state.user_connections.len()
    }
}
