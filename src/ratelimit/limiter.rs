//! Admission checks keyed by (identifier, category)

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::util::time::{Clock, MonotonicClock};

use super::category::EventCategory;
use super::registry::{Policy, RateLimitRegistry};
use super::store::RateLimitStore;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Rejected; `retry_after` is when the oldest counted event leaves the window
    Denied { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Decision::Allowed => None,
            Decision::Denied { retry_after } => Some(*retry_after),
        }
    }
}

/// Diagnostic view of one (identifier, category) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub count: usize,
    pub max_requests: usize,
    pub window_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_timestamp: Option<u64>,
}

/// In-memory sliding-window rate limiter.
///
/// Callers must check before acting on an event and must call
/// [`RateLimiter::clear_rate_limit`] when a session ends; nothing expires on
/// its own unless [`RateLimiter::sweep_idle`] is run.
pub struct RateLimiter {
    registry: RateLimitRegistry,
    store: RateLimitStore,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(registry: RateLimitRegistry) -> Self {
        Self::with_clock(registry, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(registry: RateLimitRegistry, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            store: RateLimitStore::new(),
            clock,
        }
    }

    pub fn registry(&self) -> &RateLimitRegistry {
        &self.registry
    }

    /// Current reading of the limiter's clock, in milliseconds
    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Admit or reject one event. An allowed event is recorded in the window.
    pub fn check_rate_limit(&self, identifier: &str, category: EventCategory) -> Decision {
        let config = match self.registry.policy(category) {
            Policy::Limited(config) => config,
            Policy::Unlimited => return Decision::Allowed,
        };

        let now = self.clock.now_millis();
        let decision = self.store.admit(identifier, category, &config, now);

        match decision {
            Decision::Allowed => {
                trace!(identifier, category = %category, "Event admitted");
            }
            Decision::Denied { retry_after } => {
                debug!(
                    identifier,
                    category = %category,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Rate limit exceeded"
                );
            }
        }

        decision
    }

    /// String-keyed form of [`RateLimiter::check_rate_limit`]; unknown names are admitted
    pub fn check_named(&self, identifier: &str, category: &str) -> Decision {
        match category.parse::<EventCategory>() {
            Ok(category) => self.check_rate_limit(identifier, category),
            Err(_) => {
                trace!(identifier, category, "Unknown category, admitting");
                Decision::Allowed
            }
        }
    }

    /// Drop everything recorded for an identifier. Idempotent.
    pub fn clear_rate_limit(&self, identifier: &str) {
        if self.store.remove(identifier) {
            info!(identifier, "Cleared rate limit state");
        }
    }

    pub fn clear_all_rate_limits(&self) {
        self.store.clear();
        info!("Cleared all rate limit state");
    }

    /// Prunes as a side effect. `None` for categories without a budget.
    pub fn get_rate_limit_status(
        &self,
        identifier: &str,
        category: EventCategory,
    ) -> Option<RateLimitStatus> {
        let config = self.registry.get(category)?;
        let now = self.clock.now_millis();
        Some(self.store.status(identifier, category, config, now))
    }

    /// Remove identifiers with no events left in any window
    pub fn sweep_idle(&self) -> usize {
        let now = self.clock.now_millis();
        let removed = self.store.sweep(&self.registry, now);
        if removed > 0 {
            debug!(removed, remaining = self.store.len(), "Swept idle rate limit state");
        }
        removed
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.store.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitRegistry::default())
    }
}
