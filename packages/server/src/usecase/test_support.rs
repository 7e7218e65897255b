//! Fixtures shared by the use case tests.

use std::sync::{Arc, Mutex};

use crate::{
    domain::{
        ChannelId, ChannelMembership, ConnectionId, ConnectionRegistry, Delivery, ObservedEvent,
        OutboundEvent, PostId, RealtimeObserver, UserId,
    },
    infrastructure::repository::{InMemoryChannelMembership, InMemoryConnectionRegistry},
};

/// Observer that keeps every event for later assertions.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(ObservedEvent::name).collect()
    }
}

impl RealtimeObserver for RecordingObserver {
    fn observe(&self, event: ObservedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) fn conn(id: &str) -> ConnectionId {
    ConnectionId::try_from(id).unwrap()
}

pub(crate) fn user(id: &str) -> UserId {
    UserId::try_from(id).unwrap()
}

pub(crate) fn post(id: &str) -> PostId {
    PostId::try_from(id).unwrap()
}

/// In-memory stores plus a recording observer.
pub(crate) struct Stores {
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub membership: Arc<InMemoryChannelMembership>,
    pub observer: Arc<RecordingObserver>,
}

impl Stores {
    pub(crate) fn new() -> Self {
        Self {
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            membership: Arc::new(InMemoryChannelMembership::new()),
            observer: Arc::new(RecordingObserver::default()),
        }
    }

    /// Registers the connection and joins its personal channel, as admission does.
    pub(crate) async fn admit(&self, connection_id: &str, user_id: &str) {
        self.registry
            .register(conn(connection_id), user(user_id))
            .await;
        self.membership
            .join(ChannelId::User(user(user_id)), conn(connection_id))
            .await;
    }
}

/// Events a connection would receive from the given deliveries.
pub(crate) fn received_by<'a>(
    deliveries: &'a [Delivery],
    connection_id: &str,
) -> Vec<&'a OutboundEvent> {
    let connection_id = conn(connection_id);
    deliveries
        .iter()
        .filter(|delivery| delivery.reaches(&connection_id))
        .map(|delivery| &delivery.event)
        .collect()
}
