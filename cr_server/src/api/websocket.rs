//! Websocket transport: one socket per connection, a writer task draining
//! the connection's event channel, and a read loop feeding parsed client
//! messages into the game server.
//!
//! The writer task is what keeps a stalled socket from blocking anything
//! else: table actors and the registry only ever push onto the channel.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};

use card_room::ClientMessage;

use super::AppState;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (conn_id, mut events) = state.server.connect().await;
    info!("websocket connected: {conn_id}");

    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("failed to serialize event: {e}"),
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_message) => {
                    state.server.handle_message(conn_id, client_message).await;
                }
                Err(e) => {
                    debug!("unparseable frame on {conn_id}: {e}");
                    state.server.send_error(conn_id, "invalid message format").await;
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("websocket error on {conn_id}: {e}");
                break;
            }
            _ => {}
        }
    }

    // The player keeps their seat; only the subscription goes away.
    state.server.disconnect(conn_id).await;
    send_task.abort();
    info!("websocket disconnected: {conn_id}");
}
