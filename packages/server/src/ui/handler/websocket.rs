//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use serde::Deserialize;
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};
use uuid::Uuid;

use crate::{
    domain::{ConnectionId, Identity},
    infrastructure::dto::{conversion::parse_client_frame, http::ErrorResponse},
    ui::{delivery::push_deliveries, state::AppState},
};

use super::bearer_token;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// `GET /ws`
///
/// 資格情報はアップグレード前に検証する。失敗した場合は 401 を返し、
/// 何も登録しない。
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Response {
    let credential = query.token.or_else(|| bearer_token(&headers));

    let identity = match state
        .connect_client_usecase
        .authenticate(credential.as_deref())
    {
        Ok(identity) => identity,
        Err(error) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response();
        }
    };

    let connection_id = match ConnectionId::new(Uuid::new_v4().to_string()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to allocate connection id: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, identity, connection_id))
        .into_response()
}

/// Spawns a task that drains the connection's queue into the WebSocket sink.
///
/// The same task sends a ping every `ping_interval`, so one writer owns the sink
/// and frames keep their queue order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    ping_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Reads client frames until the peer goes away or `stop` fires.
///
/// `stop` is only checked while waiting for the next frame. A frame that has
/// been read is handled and its deliveries pushed before the loop looks again,
/// so a presence change and its broadcast are never split.
async fn receive_loop<S>(
    mut frames: S,
    mut stop: watch::Receiver<bool>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    ping_timeout: Duration,
) -> &'static str
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = stop.changed() => return "sender closed",
            // Any frame (including pong) counts as activity
            next = tokio::time::timeout(ping_timeout, frames.next()) => next,
        };

        let msg = match next {
            Err(_) => return "heartbeat timeout",
            Ok(None) => return "transport closed",
            Ok(Some(Err(e))) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    "WebSocket error: {}",
                    e
                );
                return "transport error";
            }
            Ok(Some(Ok(msg))) => msg,
        };

        match msg {
            Message::Text(text) => {
                let frame = parse_client_frame(text.as_str());
                let deliveries = state
                    .handle_client_event_usecase
                    .execute(&connection_id, frame)
                    .await;
                push_deliveries(state.message_pusher.as_ref(), deliveries).await;
            }
            Message::Close(_) => return "client closed",
            _ => {}
        }
    }
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    identity: Identity,
    connection_id: ConnectionId,
) {
    let (sender, receiver) = socket.split();

    // Register before reading any frame so deliveries can reach this connection
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .connect_client_usecase
        .execute(connection_id.clone(), &identity, tx)
        .await;

    let heartbeat = state.heartbeat;
    let mut send_task = pusher_loop(rx, sender, heartbeat.ping_interval);

    // Spawn a task to receive frames from this client
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        stop_rx,
        state.clone(),
        connection_id.clone(),
        heartbeat.ping_timeout,
    ));

    let finished = tokio::select! {
        result = &mut recv_task => Some(result.unwrap_or("receiver task failed")),
        _ = &mut send_task => None,
    };

    let reason = match finished {
        Some(reason) => {
            send_task.abort();
            reason
        }
        None => {
            // 受信側はフレームの区切りで止める（処理中のイベントは最後まで流す）
            let _ = stop_tx.send(true);
            recv_task.await.unwrap_or("receiver task failed")
        }
    };

    // Cleanup runs whatever ended the connection
    let deliveries = state
        .disconnect_client_usecase
        .execute(&connection_id, reason)
        .await;
    push_deliveries(state.message_pusher.as_ref(), deliveries).await;
}
