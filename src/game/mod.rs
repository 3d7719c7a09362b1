//! Boundary to the game-logic service
//!
//! Rules, turn order and room management live outside the gateway. Admitted
//! events are handed over on an mpsc channel; the consumer here only logs.

use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ws::protocol::ClientMsg;

/// Event forwarded to game logic after admission
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Client message that passed admission control
    Message {
        connection_id: Uuid,
        msg: ClientMsg,
        received_at: u64,
    },

    /// Connection closed; its rate limit state has been evicted
    Disconnected { connection_id: Uuid },
}

/// Drain admitted events until every sender is dropped
pub async fn log_events(mut rx: mpsc::Receiver<GatewayEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            GatewayEvent::Message {
                connection_id,
                msg,
                received_at,
            } => {
                debug!(connection_id = %connection_id, received_at, ?msg, "Game event");
            }
            GatewayEvent::Disconnected { connection_id } => {
                debug!(connection_id = %connection_id, "Game session ended");
            }
        }
    }

    info!("Game event channel closed");
}
