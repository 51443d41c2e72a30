//! Socket endpoint
//!
//! Each connection gets an id, an outbound queue drained by a writer task, and
//! a read loop feeding frames to the session controller. Closing the socket
//! abandons whatever match the connection was seated in.

use crate::protocol::{ClientFrame, Request, ServerMessage};
use crate::registry::ConnectionId;
use crate::state::ServerState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    let conn = state.next_connection_id();
    let (mut sink, mut stream) = socket.split();
    let (queue, mut outgoing) = mpsc::unbounded_channel::<ServerMessage>();
    state.lobby().connect(conn, queue);
    tracing::debug!("{} connected", conn);

    // Ends when the controller drops the queue on disconnect
    let writer = tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!("{} failed to encode message: {}", conn, err);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_text(&state, conn, &text),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!("{} socket error: {}", conn, err);
                break;
            }
        }
    }

    state.lobby().disconnect(conn);
    tracing::debug!("{} disconnected", conn);

    if let Err(err) = writer.await {
        tracing::warn!("{} writer task failed: {}", conn, err);
    }
}

/// Decode one text frame and run it under the lobby lock
fn handle_text(state: &ServerState, conn: ConnectionId, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!("{} sent a malformed frame: {}", conn, err);
            return;
        }
    };

    let request = match Request::from_frame(&frame.event, frame.payload) {
        Some(request) => request,
        None => {
            tracing::warn!("{} sent unknown event {:?}", conn, frame.event);
            return;
        }
    };

    let mut lobby = state.lobby();
    let reply = lobby.handle(conn, request);
    if let Some(ack) = frame.ack {
        lobby.acknowledge(conn, ack, reply);
    }
}
