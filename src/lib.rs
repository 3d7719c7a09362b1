//! Card Game Gateway - real-time event gateway with admission control
//!
//! Every inbound client event passes a per-connection, per-category
//! sliding-window rate limit before it reaches game logic.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod ratelimit;
pub mod util;
pub mod ws;
