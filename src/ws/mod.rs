//! Real-time WebSocket gateway

pub mod handler;
pub mod protocol;
