//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ratelimit::EventCategory;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Play a combo from the hand
    PlayCards {
        /// Card codes, e.g. "3S", "KH"
        cards: Vec<String>,
    },

    /// Pass the current turn
    PassTurn,

    /// Send an emote to the table
    SendEmote { emote: String },

    /// Request the lobby room list
    GetPublicRooms,

    /// Request a full state resync
    RequestSync {
        /// Last event sequence the client applied, if any
        #[serde(default)]
        last_seq: Option<u64>,
    },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

impl ClientMsg {
    /// Rate limit category for this message; `None` is never metered
    pub fn category(&self) -> Option<EventCategory> {
        match self {
            ClientMsg::PlayCards { .. } => Some(EventCategory::PlayCards),
            ClientMsg::PassTurn => Some(EventCategory::PassTurn),
            ClientMsg::SendEmote { .. } => Some(EventCategory::EmoteSent),
            ClientMsg::GetPublicRooms => Some(EventCategory::GetPublicRooms),
            ClientMsg::RequestSync { .. } => Some(EventCategory::RequestSync),
            ClientMsg::Ping { .. } => None,
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        connection_id: Uuid,
        server_time: u64,
    },

    /// Event rejected by admission control
    RateLimited {
        category: EventCategory,
        /// Earliest point, relative to now, at which a retry can succeed
        retry_after_ms: u64,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}
