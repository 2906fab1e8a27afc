//! WebSocket endpoint and per-connection actor.
//!
//! Each accepted socket is split into a writer task draining the outbound
//! channel and a reader loop decoding client frames into router events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use huddle_core::{AckPayload, ClientFrame, ConnectionId, ServerEvent};

use crate::connections::OUTBOUND_BUFFER;
use crate::server::AppState;

/// GET /ws
///
/// Upgrades the connection and hands the socket to the per-connection
/// actor.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    info!(connection = %connection_id, "WebSocket connection established");

    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);
    state.connections.register(connection_id, tx.clone());

    let writer = tokio::spawn(writer_task(ws_sender, rx));

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_text_frame(&state, connection_id, &tx, &text).await;
            }
            Ok(Message::Binary(_)) => {
                warn!(connection = %connection_id, "Binary frames are not part of the protocol");
            }
            Ok(Message::Ping(data)) => {
                let _ = tx.send(Message::Pong(data)).await;
            }
            Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                debug!(connection = %connection_id, "Client requested close");
                break;
            }
            Err(err) => {
                warn!(connection = %connection_id, error = %err, "WebSocket receive error");
                break;
            }
        }
    }

    writer.abort();
    state.connections.unregister(connection_id);
    state.router.handle_disconnect(connection_id).await;

    info!(connection = %connection_id, "WebSocket connection closed");
}

/// Forward queued outbound messages to the socket sink.
async fn writer_task(mut ws_sender: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            break;
        }
    }
}

/// Decode a text frame and dispatch it to the router.
async fn handle_text_frame(
    state: &AppState,
    connection_id: ConnectionId,
    tx: &mpsc::Sender<Message>,
    text: &str,
) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(connection = %connection_id, error = %err, "Malformed client frame");
            reply_frame_error(tx, text, &err).await;
            return;
        }
    };

    state.router.dispatch(connection_id, frame).await;
}

/// Reply with an error ack when a malformed frame still carried an ack id.
async fn reply_frame_error(tx: &mpsc::Sender<Message>, raw: &str, err: &serde_json::Error) {
    let ack = serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|value| value.get("ack").and_then(|a| a.as_u64()));
    let Some(ack) = ack else {
        return;
    };

    let event = ServerEvent::Ack(AckPayload::error(ack, format!("invalid frame: {err}")));
    if let Ok(text) = serde_json::to_string(&event) {
        let _ = tx.send(Message::Text(text)).await;
    }
}
