//! Per-identifier, per-category sliding-window admission control

mod category;
mod limiter;
mod registry;
mod store;

pub use category::{EventCategory, UnknownCategory};
pub use limiter::{Decision, RateLimitStatus, RateLimiter};
pub use registry::{
    Policy, RateLimitConfig, RateLimitRegistry, EMOTE_SENT_LIMIT, GET_PUBLIC_ROOMS_LIMIT,
    PASS_TURN_LIMIT, PLAY_CARDS_LIMIT, REQUEST_SYNC_LIMIT,
};
pub use store::{RateLimitEntry, RateLimitStore};
