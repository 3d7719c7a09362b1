//! Application state shared across routes

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::game::GatewayEvent;
use crate::ratelimit::RateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Admitted events bound for game logic
    pub events_tx: mpsc::Sender<GatewayEvent>,
}

impl AppState {
    /// Build state around a limiter using the configured budgets.
    /// Returns the receiving end of the game event channel.
    pub fn new(config: Config) -> (Self, mpsc::Receiver<GatewayEvent>) {
        let rate_limiter = RateLimiter::new(config.rate_limits.clone());
        Self::with_limiter(config, rate_limiter)
    }

    pub fn with_limiter(
        config: Config,
        rate_limiter: RateLimiter,
    ) -> (Self, mpsc::Receiver<GatewayEvent>) {
        let (events_tx, events_rx) = mpsc::channel(config.event_channel_capacity);

        let state = Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(rate_limiter),
            events_tx,
        };

        (state, events_rx)
    }
}
