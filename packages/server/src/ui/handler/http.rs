//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{CommentEvent, NotificationRecord, PostId, UserId},
    infrastructure::dto::http::{
        CommentDispatchResponse, CommentRequest, ErrorResponse, HealthResponse,
        NotificationDispatchResponse, NotificationRequest, PostViewersResponse,
        UserConnectionsResponse,
    },
    ui::{delivery::push_deliveries, state::AppState},
    usecase::DispatchOutcome,
};

use super::bearer_token;

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Debug endpoint: connection ids of a user
pub async fn debug_user_connections(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserConnectionsResponse>, Response> {
    let user_id = UserId::new(user_id).map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?;
    let connections = state
        .inspect_presence_usecase
        .connections_of(&user_id)
        .await;

    Ok(Json(UserConnectionsResponse {
        user_id: user_id.into_string(),
        connections: connections
            .into_iter()
            .map(|connection_id| connection_id.into_string())
            .collect(),
    }))
}

/// Debug endpoint: distinct users in a post channel
pub async fn debug_post_viewers(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<PostViewersResponse>, Response> {
    let post_id = PostId::new(post_id).map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?;
    let viewers = state.inspect_presence_usecase.viewers_of(&post_id).await;

    Ok(Json(PostViewersResponse {
        post_id: post_id.into_string(),
        viewers: viewers.into_iter().map(UserId::into_string).collect(),
    }))
}

/// `/internal` guard: requires the configured bearer token, if any.
pub async fn require_internal_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.internal_token.as_deref() {
        if bearer_token(request.headers()).as_deref() != Some(expected) {
            tracing::warn!(
                path = %request.uri().path(),
                "Rejected internal request without a valid token"
            );
            return error_response(StatusCode::UNAUTHORIZED, "Invalid internal token");
        }
    }
    next.run(request).await
}

/// `POST /internal/notifications`
///
/// 永続化済みの通知を受け取り、抑制判定のうえ受信者の個人チャンネルへ送る。
pub async fn dispatch_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationRequest>,
) -> Response {
    let record = match NotificationRecord::try_from(request) {
        Ok(record) => record,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let recipients = match state.dispatch_notification_usecase.execute(record).await {
        DispatchOutcome::Suppressed => 0,
        DispatchOutcome::Pushed(delivery) => {
            push_deliveries(state.message_pusher.as_ref(), vec![delivery]).await
        }
    };

    Json(NotificationDispatchResponse {
        delivered: recipients > 0,
        recipients,
    })
    .into_response()
}

/// `POST /internal/comments`
///
/// 作成済みのコメント・返信を関係者と投稿の閲覧者へ送る。
pub async fn deliver_comment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommentRequest>,
) -> Response {
    let comment = match CommentEvent::try_from(request) {
        Ok(comment) => comment,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let deliveries = match state.deliver_comment_usecase.execute(comment).await {
        Ok(deliveries) => deliveries,
        Err(e) => {
            tracing::error!("Failed to deliver comment: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };

    let count = deliveries.len();
    let recipients = push_deliveries(state.message_pusher.as_ref(), deliveries).await;

    Json(CommentDispatchResponse {
        deliveries: count,
        recipients,
    })
    .into_response()
}
