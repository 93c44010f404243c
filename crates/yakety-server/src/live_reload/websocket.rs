//! WebSocket handler for live reload.
//!
//! Each upgraded connection becomes one session. Notifications reach the
//! socket through an in-process channel so the hub never awaits network I/O.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;

use super::hub::HubHandle;
use super::registry::{SendError, Transport};
use crate::state::AppState;

/// Transport backed by the queue a connection task drains into its socket.
#[derive(Debug)]
struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl Transport for ChannelTransport {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, message: &str) -> Result<(), SendError> {
        self.tx
            .send(message.to_owned())
            .map_err(|_| SendError::Closed)
    }
}

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(live_reload) = state.live_reload.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let hub = live_reload.hub().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, hub: HubHandle) {
    let (tx, mut outbound) = mpsc::unbounded_channel::<String>();
    let id = hub.register(Arc::new(ChannelTransport { tx }));

    loop {
        tokio::select! {
            message = outbound.recv() => {
                let Some(message) = message else { break };
                if socket.send(Message::Text(message.into())).await.is_err() {
                    break;
                }
            }
            // Inbound frames carry no meaning; only closure matters
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // Closing the queue first lets an in-flight round see the session as closed
    outbound.close();
    hub.unregister(id);
}
