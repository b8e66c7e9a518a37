//! WebSocket handler for live snapshot updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, WebSocketMessage};

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let cache = state.engine.cache();
    let mut rx = cache.subscribe();
    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let msg = match rx.recv().await {
                Ok(event) => WebSocketMessage::from(event),
                // Only the latest revision matters to a client.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "WebSocket client lagged behind refreshes");
                    WebSocketMessage::CacheRefreshed {
                        revision: cache.snapshot().revision,
                    }
                }
                Err(RecvError::Closed) => break,
            };
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode WebSocket message");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                debug!("WebSocket client sent close frame");
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("WebSocket client disconnected");
}
