//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        debug_post_viewers, debug_user_connections, deliver_comment, dispatch_notification,
        health_check, require_internal_token, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Realtime presence server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state);
/// server.run("127.0.0.1".to_string(), 5000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router with every route and the trace layer.
    pub fn router(&self) -> Router {
        // REST 側から呼ばれるブリッジと、在室状況を覗くデバッグ用ルート
        let internal = Router::new()
            .route("/internal/notifications", post(dispatch_notification))
            .route("/internal/comments", post(deliver_comment))
            .route(
                "/debug/users/{user_id}/connections",
                get(debug_user_connections),
            )
            .route("/debug/posts/{post_id}/viewers", get(debug_post_viewers))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_internal_token,
            ));

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .merge(internal)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Realtime server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws?token=<jwt>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;
        Ok(())
    }
}
