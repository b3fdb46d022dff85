//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        delete_message, delete_notification, health_check, list_messages, list_notifications,
        mark_all_notifications_read, mark_messages_read, mark_notification_read, post_event,
        send_message, websocket_handler,
    },
    MAX_INBOUND_BYTES,
    signal::shutdown_signal,
    state::AppState,
};

/// Real-time chat and notification server
///
/// # Example
///
/// ```ignore
/// let state = build_app_state(&config, directory);
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/projects/{project_id}/messages", get(list_messages))
            .route("/api/messages", post(send_message))
            .route("/api/messages/read", put(mark_messages_read))
            .route("/api/messages/{message_id}", delete(delete_message))
            .route("/api/notifications", get(list_notifications))
            .route(
                "/api/notifications/read-all",
                put(mark_all_notifications_read),
            )
            .route(
                "/api/notifications/{notification_id}/read",
                put(mark_notification_read),
            )
            .route(
                "/api/notifications/{notification_id}",
                delete(delete_notification),
            )
            .route("/api/events", post(post_event))
            // 画像・動画の data URL を含む本文を受け付ける
            .layer(DefaultBodyLimit::max(MAX_INBOUND_BYTES))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let app = self.router();
        tracing::info!("Teamroom server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), std::io::Error> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws?user_id=<id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener).await
    }
}
