//! WebSocket Connection Handler
//!
//! The route sits behind the authentication middleware, so by the time the
//! upgrade runs the identity is already resolved. Each connection gets a
//! reader loop (this task) and a writer task draining its handle.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Extension, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use super::connection::ConnectionHandle;
use super::messages::PayloadError;
use super::session::ConnectionContext;
use crate::domain::UserIdentity;
use crate::presentation::middleware::AuthUser;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(AuthUser { identity }): Extension<AuthUser>,
) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Drive one admitted connection until it closes
async fn handle_socket(socket: WebSocket, state: AppState, identity: UserIdentity) {
    let (handle, mut rx) = ConnectionHandle::new();
    let ctx = ConnectionContext::new(identity, handle.clone());
    let user_id = ctx.identity.id.clone();
    let connection_id = ctx.connection_id();

    let (mut sender, mut receiver) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state.gateway.admit(&user_id, handle);

    // Frames of one connection are handled strictly in arrival order.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                // Errors were already reported to the client.
                let _ = state.events.handle_text(&ctx, text.as_str());
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %connection_id, "Close frame received");
                break;
            }
            Ok(Message::Binary(_)) => {
                let err = PayloadError::MalformedFrame("binary frames are not supported".into());
                state.events.reject(&ctx, &err);
            }
            // Ping/Pong are answered by axum
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    state.gateway.disconnect(&user_id, connection_id);
    writer.abort();

    tracing::info!(
        user_id = %user_id,
        connection_id = %connection_id,
        duration_secs = ctx.uptime().as_secs(),
        "User disconnected"
    );
}
