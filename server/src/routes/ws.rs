use crate::Service;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State as AxumState,
    },
    response::IntoResponse,
};
use dropclub_types::api::UpdatesFilter;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Deserialize)]
pub struct UpdatesQuery {
    /// `all` (default) or `account:<id>`.
    #[serde(default)]
    filter: String,
}

pub async fn updates(
    AxumState(service): AxumState<Arc<Service>>,
    Query(query): Query<UpdatesQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_updates(socket, service, query.filter))
}

async fn handle_updates(socket: WebSocket, service: Arc<Service>, filter: String) {
    tracing::info!("Updates WebSocket connected, filter: {}", filter);
    let (mut sender, mut receiver) = socket.split();
    let mut updates = service.update_subscriber();

    let subscription = match filter.parse::<UpdatesFilter>() {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!("Failed to parse updates filter: {}", e);
            let _ = sender.close().await;
            return;
        }
    };

    loop {
        tokio::select! {
            // Handle incoming WebSocket messages (ping/pong/close)
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Client closed WebSocket connection");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            tracing::warn!("Failed to send pong, client disconnected");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {:?}", e);
                        break;
                    }
                    None => {
                        tracing::info!("WebSocket stream ended");
                        break;
                    }
                    _ => {} // Ignore other message types
                }
            }
            // Handle broadcast updates
            update = updates.recv() => {
                match update {
                    Ok(update) => {
                        if !subscription.accepts(&update) {
                            continue;
                        }
                        let body = match serde_json::to_string(&update) {
                            Ok(body) => body,
                            Err(e) => {
                                tracing::error!("Failed to serialize update: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(body)).await.is_err() {
                            tracing::warn!("Failed to send update, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "WebSocket client lagged behind, skipped {} messages. Consider increasing buffer size.",
                            skipped
                        );
                        // Continue receiving - client may catch up
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Broadcast channel closed");
                        break;
                    }
                }
            }
        }
    }
    tracing::info!("Updates WebSocket handler exiting");
    let _ = sender.close().await;
}
