//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{PlayerInput, SessionEvent};
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    // Identity is ours, not the transport's
    let session_id = Uuid::new_v4();
    info!(session_id = %session_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    let welcome = ServerMsg::Welcome { session_id };
    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(session_id = %session_id, error = %e, "Failed to send welcome");
        return;
    }

    // Subscribe before announcing so the connect roster reaches this session too
    let updates_rx = state.world.subscribe();
    let input_tx = state.world.input_tx.clone();

    if send_event(&input_tx, session_id, SessionEvent::Connected).await.is_err() {
        error!(session_id = %session_id, "World loop is not running");
        return;
    }

    run_session(session_id, ws_sink, ws_stream, &input_tx, updates_rx).await;

    // Always reported, whatever ended the session
    let _ = send_event(&input_tx, session_id, SessionEvent::Disconnected).await;

    info!(session_id = %session_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    session_id: Uuid,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    input_tx: &mpsc::Sender<PlayerInput>,
    mut updates_rx: broadcast::Receiver<ServerMsg>,
) {
    // Spawn writer task: broadcasts -> WebSocket
    let mut writer_handle = tokio::spawn(async move {
        loop {
            match updates_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(session_id = %session_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        session_id = %session_id,
                        lagged_count = n,
                        "Client lagged, skipping {} updates", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(session_id = %session_id, "Update channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> world loop. A dead writer ends the session too.
    loop {
        let result = tokio::select! {
            result = ws_stream.next() => result,
            _ = &mut writer_handle => {
                debug!(session_id = %session_id, "Writer finished, closing session");
                return;
            }
        };

        let Some(result) = result else {
            break;
        };

        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(client_msg) => {
                    let event = SessionEvent::Message(client_msg);
                    if send_event(input_tx, session_id, event).await.is_err() {
                        debug!(session_id = %session_id, "Input channel closed");
                        break;
                    }
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(session_id = %session_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(session_id = %session_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(session_id = %session_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Forward a session event to the world loop
async fn send_event(
    input_tx: &mpsc::Sender<PlayerInput>,
    session_id: Uuid,
    event: SessionEvent,
) -> Result<(), mpsc::error::SendError<PlayerInput>> {
    input_tx
        .send(PlayerInput {
            session_id,
            event,
            received_at: unix_millis(),
        })
        .await
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
