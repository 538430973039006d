pub mod broadcast;
pub mod events;
pub mod presence;
pub mod registry;

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::state::AppState;
use registry::ConnectionHandle;

/// `GET /ws?userId=...` — admission happens on the upgraded socket; a
/// missing or empty userId is tolerated, not rejected (see handle_socket).
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Response {
    let user_id = params
        .get("userId")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Option<String>) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    // No identity: serve the socket unregistered. It stays open, receives no
    // events, and is invisible to presence; closing it touches no state.
    let Some(user_id) = user_id else {
        tracing::debug!("connection without userId, serving unregistered");
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
        return;
    };

    // Channel for sending events to this client.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let conn = ConnectionHandle::new(tx);
    let connection_id = conn.id().to_string();

    let came_online = state.registry.register(&user_id, conn.clone());
    state.presence.connection_admitted(&user_id, came_online, &conn);
    tracing::debug!(%user_id, %connection_id, "connection admitted");

    loop {
        tokio::select! {
            // Queued outbound events from the registry side.
            Some(payload) = rx.recv() => {
                if ws_sink.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            // Inbound frames are drained but carry no protocol; only
            // close/error matters.
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    // Teardown runs once, whatever ended the loop. Deregistration is
    // idempotent, so a broadcast-side reap racing us is harmless.
    let went_offline = state.registry.deregister(&user_id, &connection_id);
    state.presence.connection_closed(&user_id, went_offline);
    tracing::debug!(%user_id, %connection_id, "connection closed");
}
