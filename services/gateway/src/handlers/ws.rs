use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use bid_feed::Channel;
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use types::ids::ListingId;

/// Cap on concurrent listing subscriptions per connection
const MAX_SUBSCRIPTIONS: usize = 50;

/// Client subscription request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeMessage {
    /// Action: "subscribe" or "unsubscribe"
    pub action: String,
    /// Channels to subscribe/unsubscribe, e.g. `bids@<listing-uuid>`
    pub channels: Vec<String>,
}

/// Server response to a subscription request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub action: String,
    pub channels: Vec<String>,
    pub success: bool,
    pub error: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, AppError> {
    state.rate_limiter.check(&user.wallet, "ws_connect", 10, 1.0)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // All outbound traffic (acks and pushed events) funnels through one
    // writer task so subscription forwarders never contend on the sink
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(64);
    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut subscriptions: HashMap<ListingId, JoinHandle<()>> = HashMap::new();

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                let Ok(request) = serde_json::from_str::<SubscribeMessage>(&text) else {
                    let response = SubscribeResponse {
                        action: "error".to_string(),
                        channels: Vec::new(),
                        success: false,
                        error: Some("unparseable message".to_string()),
                    };
                    send_json(&out_tx, &response).await;
                    continue;
                };
                let response = apply(&state, &mut subscriptions, &out_tx, &request);
                send_json(&out_tx, &response).await;
            }
            Message::Close(_) => break,
            // Pings are answered by axum automatically
            _ => {}
        }
    }

    // Disconnect: leave every room
    for (listing_id, task) in subscriptions.drain() {
        task.abort();
        state.feed.prune(&listing_id);
    }
    writer.abort();
}

/// Apply a subscribe/unsubscribe request to this connection's rooms
fn apply(
    state: &AppState,
    subscriptions: &mut HashMap<ListingId, JoinHandle<()>>,
    out_tx: &mpsc::Sender<Message>,
    request: &SubscribeMessage,
) -> SubscribeResponse {
    let mut accepted = Vec::new();

    for raw in &request.channels {
        let Some(channel) = Channel::parse(raw) else {
            return SubscribeResponse {
                action: request.action.clone(),
                channels: accepted,
                success: false,
                error: Some(format!("unknown channel: {raw}")),
            };
        };
        let listing_id = channel.listing_id();

        match request.action.as_str() {
            "subscribe" => {
                if subscriptions.len() >= MAX_SUBSCRIPTIONS {
                    return SubscribeResponse {
                        action: request.action.clone(),
                        channels: accepted,
                        success: false,
                        error: Some(format!("max subscriptions ({MAX_SUBSCRIPTIONS}) reached")),
                    };
                }
                // Idempotent join
                subscriptions.entry(listing_id).or_insert_with(|| {
                    forward_room(state, listing_id, out_tx.clone())
                });
            }
            "unsubscribe" => {
                if let Some(task) = subscriptions.remove(&listing_id) {
                    task.abort();
                    state.feed.prune(&listing_id);
                }
            }
            other => {
                return SubscribeResponse {
                    action: other.to_string(),
                    channels: accepted,
                    success: false,
                    error: Some(format!("unknown action: {other}")),
                };
            }
        }
        accepted.push(raw.clone());
    }

    SubscribeResponse {
        action: request.action.clone(),
        channels: accepted,
        success: true,
        error: None,
    }
}

/// Forward a room's events to this connection until it unsubscribes
fn forward_room(
    state: &AppState,
    listing_id: ListingId,
    out_tx: mpsc::Sender<Message>,
) -> JoinHandle<()> {
    let mut room = state.feed.subscribe(listing_id);
    tokio::spawn(async move {
        loop {
            match room.recv().await {
                Ok(event) => {
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if out_tx.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                // Missed events while lagging; the client reconciles by
                // re-fetching the highest bid
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(%listing_id, skipped, "subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn send_json<T: Serialize>(out_tx: &mpsc::Sender<Message>, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        let _ = out_tx.send(Message::Text(json)).await;
    }
}
