//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::ratelimit::{EventCategory, RateLimitConfig, RateLimitRegistry};

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Budgets per event category, after overrides
    pub rate_limits: RateLimitRegistry,
    /// Idle sweep interval; `None` leaves eviction entirely to disconnects
    pub sweep_interval: Option<Duration>,
    /// Buffer size of the channel feeding admitted events to game logic
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = if let Some(port) = lookup("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string())
        };

        let sweep_secs = match lookup("RATE_LIMIT_SWEEP_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("RATE_LIMIT_SWEEP_INTERVAL_SECS", raw))?,
            None => 0,
        };

        let event_channel_capacity = match lookup("EVENT_CHANNEL_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::Invalid("EVENT_CHANNEL_CAPACITY", raw)),
            },
            None => DEFAULT_EVENT_CHANNEL_CAPACITY,
        };

        let mut rate_limits = RateLimitRegistry::default();
        for category in EventCategory::ALL {
            let key = category.env_key();
            if let Some(raw) = lookup(&key) {
                rate_limits = match parse_budget(&raw) {
                    Ok(Some(budget)) => rate_limits.with_budget(category, budget),
                    Ok(None) => rate_limits.without(category),
                    Err(()) => return Err(ConfigError::InvalidBudget(key, raw)),
                };
            }
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            rate_limits,
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            event_channel_capacity,
        })
    }
}

/// Parse `<max_requests>/<window_ms>`, or `off` to drop the budget
fn parse_budget(raw: &str) -> Result<Option<RateLimitConfig>, ()> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("off") {
        return Ok(None);
    }

    let (max, window) = raw.split_once('/').ok_or(())?;
    let max_requests: usize = max.trim().parse().map_err(|_| ())?;
    let window_ms: u64 = window.trim().parse().map_err(|_| ())?;

    if max_requests == 0 || window_ms == 0 {
        return Err(());
    }

    Ok(Some(RateLimitConfig::new(max_requests, window_ms)))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("Invalid rate limit for {0}: {1:?} (expected <max>/<window_ms> or off)")]
    InvalidBudget(String, String),
}
