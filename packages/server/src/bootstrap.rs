//! Wires the in-memory stores, adapters and use cases into a [`Server`].

use std::sync::Arc;

use postwatch_shared::time::SystemClock;

use crate::{
    config::ServerConfig,
    infrastructure::{
        auth::JwtIdentityVerifier,
        message_pusher::WebSocketMessagePusher,
        observer::TracingObserver,
        repository::{InMemoryChannelMembership, InMemoryConnectionRegistry},
    },
    ui::{AppState, HeartbeatConfig, Server},
    usecase::{
        ConnectClientUseCase, DeliverCommentUseCase, DisconnectClientUseCase,
        DispatchNotificationUseCase, HandleClientEventUseCase, InspectPresenceUseCase,
        RelaySignalUseCase, TrackPresenceUseCase,
    },
};

/// Build a server from a validated configuration.
pub fn build_server(config: &ServerConfig) -> Server {
    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Identity verifier, observer, clock
    // 4. UseCases
    // 5. AppState

    // 1. Create Repository (in-memory, process lifetime)
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let membership = Arc::new(InMemoryChannelMembership::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create collaborators
    let verifier = Arc::new(JwtIdentityVerifier::new(config.jwt_secret.as_bytes()));
    let observer = Arc::new(TracingObserver::new());
    let clock = Arc::new(SystemClock);

    // 4. Create UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        verifier,
        registry.clone(),
        membership.clone(),
        message_pusher.clone(),
        observer.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        registry.clone(),
        membership.clone(),
        message_pusher.clone(),
        observer.clone(),
    ));
    let track_presence_usecase = Arc::new(TrackPresenceUseCase::new(
        registry.clone(),
        membership.clone(),
        observer.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(
        registry.clone(),
        membership.clone(),
        observer.clone(),
        clock,
    ));
    let handle_client_event_usecase = Arc::new(HandleClientEventUseCase::new(
        track_presence_usecase,
        relay_signal_usecase,
        registry.clone(),
        observer.clone(),
    ));
    let dispatch_notification_usecase = Arc::new(DispatchNotificationUseCase::new(
        registry.clone(),
        membership.clone(),
        observer.clone(),
    ));
    let deliver_comment_usecase = Arc::new(DeliverCommentUseCase::new(
        registry.clone(),
        membership.clone(),
        observer,
    ));
    let inspect_presence_usecase = Arc::new(InspectPresenceUseCase::new(registry, membership));

    // 5. Create AppState
    Server::new(AppState {
        connect_client_usecase,
        disconnect_client_usecase,
        handle_client_event_usecase,
        dispatch_notification_usecase,
        deliver_comment_usecase,
        inspect_presence_usecase,
        message_pusher,
        internal_token: config.internal_token.clone(),
        heartbeat: HeartbeatConfig {
            ping_interval: config.ping_interval,
            ping_timeout: config.ping_timeout,
        },
    })
}
