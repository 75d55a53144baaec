use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shopfloor_core::live_events::{
    DASHBOARD_GROUP, MSG_TYPE_JOIN_DASHBOARD, MSG_TYPE_LEAVE_DASHBOARD,
};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// A client request understood on the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    JoinDashboard,
    LeaveDashboard,
}

#[derive(Deserialize)]
struct TypedFrame {
    #[serde(rename = "type")]
    kind: String,
}

/// Parse an inbound text frame.
///
/// Accepts `{"type":"join-dashboard"}` as well as the bare event name.
/// Anything else is ignored.
pub fn parse_client_command(text: &str) -> Option<ClientCommand> {
    let trimmed = text.trim();
    let kind = match serde_json::from_str::<TypedFrame>(trimmed) {
        Ok(frame) => frame.kind,
        Err(_) => trimmed.trim_matches('"').to_string(),
    };

    match kind.as_str() {
        MSG_TYPE_JOIN_DASHBOARD => Some(ClientCommand::JoinDashboard),
        MSG_TYPE_LEAVE_DASHBOARD => Some(ClientCommand::LeaveDashboard),
        _ => None,
    }
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by a sender task plus the receive loop below.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Handles group join/leave requests on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match parse_client_command(text.as_str()) {
                Some(ClientCommand::JoinDashboard) => {
                    ws_manager.join_group(&conn_id, DASHBOARD_GROUP).await;
                    tracing::debug!(conn_id = %conn_id, "Joined dashboard group");
                }
                Some(ClientCommand::LeaveDashboard) => {
                    ws_manager.leave_group(&conn_id, DASHBOARD_GROUP).await;
                    tracing::debug!(conn_id = %conn_id, "Left dashboard group");
                }
                None => {
                    tracing::trace!(conn_id = %conn_id, "Ignoring unknown client message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
