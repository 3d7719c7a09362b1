//! Event categories subject to admission control

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named class of inbound gateway event with its own independent budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Emote or quick-chat bubble
    EmoteSent,
    /// Playing a combo of cards
    PlayCards,
    /// Passing the current turn
    PassTurn,
    /// Lobby room-list polling
    GetPublicRooms,
    /// Full state resync, usually after a reconnect
    RequestSync,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::EmoteSent,
        EventCategory::PlayCards,
        EventCategory::PassTurn,
        EventCategory::GetPublicRooms,
        EventCategory::RequestSync,
    ];

    /// Wire name, as used in configuration and client-facing messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::EmoteSent => "emote_sent",
            EventCategory::PlayCards => "play_cards",
            EventCategory::PassTurn => "pass_turn",
            EventCategory::GetPublicRooms => "get_public_rooms",
            EventCategory::RequestSync => "request_sync",
        }
    }

    /// Environment variable overriding this category's budget
    pub fn env_key(&self) -> String {
        format!("RATE_LIMIT_{}", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
