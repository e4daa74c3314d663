//! WebSocket push channel
//!
//! A requester connects, registers the action IDs it is waiting on, and
//! receives each payload the moment the signing service posts it back.
//! One socket may register several keys over its lifetime; re-registering
//! a key moves it to this socket (last registration wins).

use crate::handlers::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use relay_core::{ActionId, Json};
use relay_engine::{ConnectionId, SubscriberHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Messages a client may send over the push channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Register interest in an action ID
    Register {
        #[serde(rename = "actionId")]
        action_id: String,
    },
}

/// Messages the server sends over the push channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Acknowledges a registration
    Registered {
        #[serde(rename = "actionId")]
        action_id: String,
    },
    /// Delivers a signing result
    Result {
        #[serde(rename = "actionId")]
        action_id: String,
        data: Json,
    },
    /// Reports a malformed client message without closing the socket
    Error { message: String },
}

/// WebSocket endpoint for the push channel
pub async fn push_channel(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_push_socket(socket, state))
}

/// Drive one push connection until either side goes away
async fn handle_push_socket(mut socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    let (handle, mut deliveries) = SubscriberHandle::new(connection_id);

    info!(connection_id = %connection_id, "push channel connected");

    loop {
        tokio::select! {
            // Deliver results pushed by the engine
            delivery = deliveries.recv() => {
                match delivery {
                    Some(delivery) => {
                        let message = ServerMessage::Result {
                            action_id: delivery.action_id.into_string(),
                            data: delivery.payload,
                        };
                        let text = serde_json::to_string(&message).unwrap();
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break, // Channel closed
                }
            }

            // Receive client messages
            ws_message = socket.recv() => {
                match ws_message {
                    Some(Ok(Message::Text(text))) => {
                        if text == "ping" {
                            if socket.send(Message::Text("pong".to_string().into())).await.is_err() {
                                break;
                            }
                            continue;
                        }

                        let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(ClientMessage::Register { action_id }) => {
                                let key = ActionId::new(action_id.clone());
                                let caught_up = state.engine.register(key, handle.clone()).await;
                                if caught_up.is_some() {
                                    debug!(
                                        connection_id = %connection_id,
                                        action_id = %action_id,
                                        "registration caught up on a stored result"
                                    );
                                }
                                ServerMessage::Registered { action_id }
                            }
                            Err(e) => {
                                warn!(connection_id = %connection_id, error = %e, "unparseable push channel message");
                                ServerMessage::Error {
                                    message: format!("expected a register message: {e}"),
                                }
                            }
                        };

                        let text = serde_json::to_string(&reply).unwrap();
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {} // Ignore other message types
                }
            }
        }
    }

    // Opportunistic cleanup; deliveries for keys this socket still holds
    // fall back to the store once the channel reads as closed
    state.engine.disconnect(connection_id).await;
    info!(connection_id = %connection_id, "push channel disconnected");
}
