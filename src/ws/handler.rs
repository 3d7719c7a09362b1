//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::GatewayEvent;
use crate::ratelimit::{Decision, RateLimiter};
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// What to do with one inbound text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Admitted, hand to game logic
    Forward(ClientMsg),
    /// Answer the client directly and do not forward
    Reply(ServerMsg),
}

/// Parse a client frame and run it through admission control
pub fn route_text(limiter: &RateLimiter, identifier: &str, text: &str) -> Inbound {
    let msg = match serde_json::from_str::<ClientMsg>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(identifier, error = %e, "Failed to parse client message");
            return Inbound::Reply(ServerMsg::Error {
                code: "bad_message".to_string(),
                message: e.to_string(),
            });
        }
    };

    if let ClientMsg::Ping { t } = msg {
        return Inbound::Reply(ServerMsg::Pong { t });
    }

    if let Some(category) = msg.category() {
        if let Decision::Denied { retry_after } = limiter.check_rate_limit(identifier, category) {
            return Inbound::Reply(ServerMsg::RateLimited {
                category,
                retry_after_ms: retry_after.as_millis() as u64,
            });
        }
    }

    Inbound::Forward(msg)
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let connection_id = Uuid::new_v4();
    info!(connection_id = %connection_id, "WebSocket upgrade");
    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, connection_id: Uuid, state: AppState) {
    info!(connection_id = %connection_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    let welcome = ServerMsg::Welcome {
        connection_id,
        server_time: unix_millis(),
    };

    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(connection_id = %connection_id, error = %e, "Failed to send welcome");
        return;
    }

    run_session(connection_id, &state, ws_sink, ws_stream).await;

    // Exactly one eviction per connection, whatever ended the session
    let identifier = connection_id.to_string();
    state.rate_limiter.clear_rate_limit(&identifier);
    if state
        .events_tx
        .send(GatewayEvent::Disconnected { connection_id })
        .await
        .is_err()
    {
        debug!(connection_id = %connection_id, "Game event channel closed");
    }

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Reader loop: WebSocket -> admission control -> game logic
async fn run_session(
    connection_id: Uuid,
    state: &AppState,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
) {
    let identifier = connection_id.to_string();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match route_text(&state.rate_limiter, &identifier, &text) {
                Inbound::Forward(msg) => {
                    let event = GatewayEvent::Message {
                        connection_id,
                        msg,
                        received_at: unix_millis(),
                    };

                    if state.events_tx.send(event).await.is_err() {
                        debug!(connection_id = %connection_id, "Game event channel closed");
                        break;
                    }
                }
                Inbound::Reply(reply) => {
                    if let Err(e) = send_msg(&mut ws_sink, &reply).await {
                        debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }
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
