//! WebSocket transport for live notifications.
//!
//! The `/ws/notifications` endpoint upgrades an HTTP connection. Once
//! connected, the handler:
//!
//! - **Creates a session:** a fresh [`SessionHandle`] with a bounded outbox,
//!   and a subscription to the [`NotificationBus`] for broadcasts.
//! - **Receives frames:** `{"type":"register","account_id":…}` routes targeted
//!   notifications for that account to this session; `{"type":"ping"}` is
//!   answered with `{"type":"pong"}`. Malformed frames are logged and ignored.
//! - **Pushes notifications:** broadcasts from the bus and targeted payloads
//!   from the outbox, both as `{"type":"notification","data":{...}}`.
//!
//! On close the session is unregistered. If a newer session already took
//! over the account, that is a no-op.
//!
//! [`NotificationBus`]: quill_core::live::bus::NotificationBus

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use quill_core::live::registry::{ConnectionRegistry, SessionHandle};
use quill_types::account::AccountId;
use quill_types::notification::NotificationPayload;

use crate::state::AppState;

/// Frame sent by a client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Register { account_id: AccountId },
    Ping,
}

/// Frame sent to a client.
///
/// Adjacently tagged: the payload carries its own `type` (scope) field.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum ServerFrame {
    Notification(NotificationPayload),
    Registered { account_id: AccountId },
    Pong,
}

/// Upgrade an HTTP request to a live notification session.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Multiplexes bus broadcasts, the session outbox, and client frames in a
/// single task so replies and pushes share one sender.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (session, mut outbox) = SessionHandle::new(state.config.session_outbox_capacity);
    let registry = state.dispatcher.registry().clone();
    let mut bus_rx = state.dispatcher.bus().subscribe();
    tracing::debug!(session_id = %session.id(), "Live session connected");

    loop {
        tokio::select! {
            bus_result = bus_rx.recv() => {
                match bus_result {
                    Ok(payload) => {
                        if send_frame(&mut ws_sender, &ServerFrame::Notification(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            session_id = %session.id(),
                            skipped = n,
                            "Live session lagged, skipping {n} notifications"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            Some(payload) = outbox.recv() => {
                if send_frame(&mut ws_sender, &ServerFrame::Notification(payload)).await.is_err() {
                    break;
                }
            }

            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = process_frame(text.as_str(), &session, &registry) {
                            if send_frame(&mut ws_sender, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Binary, ping and pong protocol frames are handled by axum.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    registry.unregister(&session.id());
    tracing::debug!(session_id = %session.id(), "Live session closed");
}

/// Apply one client frame. Returns the reply to send, if any.
fn process_frame(
    text: &str,
    session: &SessionHandle,
    registry: &ConnectionRegistry,
) -> Option<ServerFrame> {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(raw = %text, error = %err, "Ignoring malformed WebSocket frame");
            return None;
        }
    };

    match frame {
        ClientFrame::Register { account_id } => {
            registry.register(account_id, session.clone());
            Some(ServerFrame::Registered { account_id })
        }
        ClientFrame::Ping => Some(ServerFrame::Pong),
    }
}

async fn send_frame(
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::warn!("Failed to serialize live frame: {err}");
            Ok(())
        }
    }
}
