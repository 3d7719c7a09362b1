//! Per-category budgets
//!
//! Categories without a budget are **fail-open**: the limiter admits them
//! unconditionally and records nothing. A new event type is therefore not
//! protected until a budget is registered for it.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use super::category::EventCategory;

/// Budget for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitConfig {
    /// Maximum accepted events per window
    pub max_requests: usize,
    /// Rolling window length in milliseconds
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub const fn new(max_requests: usize, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Admission policy for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Limited(RateLimitConfig),
    /// No budget registered, always admitted
    Unlimited,
}

pub const EMOTE_SENT_LIMIT: RateLimitConfig = RateLimitConfig::new(5, 10_000);
pub const PLAY_CARDS_LIMIT: RateLimitConfig = RateLimitConfig::new(10, 5_000);
pub const PASS_TURN_LIMIT: RateLimitConfig = RateLimitConfig::new(5, 5_000);
pub const GET_PUBLIC_ROOMS_LIMIT: RateLimitConfig = RateLimitConfig::new(10, 10_000);
pub const REQUEST_SYNC_LIMIT: RateLimitConfig = RateLimitConfig::new(5, 10_000);

/// Read-only mapping from category to budget, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRegistry {
    budgets: HashMap<EventCategory, RateLimitConfig>,
}

impl RateLimitRegistry {
    /// Registry with no budgets; every category is fail-open
    pub fn empty() -> Self {
        Self {
            budgets: HashMap::new(),
        }
    }

    pub fn with_budget(mut self, category: EventCategory, config: RateLimitConfig) -> Self {
        self.budgets.insert(category, config);
        self
    }

    pub fn without(mut self, category: EventCategory) -> Self {
        self.budgets.remove(&category);
        self
    }

    pub fn policy(&self, category: EventCategory) -> Policy {
        match self.budgets.get(&category) {
            Some(config) => Policy::Limited(*config),
            None => Policy::Unlimited,
        }
    }

    pub fn get(&self, category: EventCategory) -> Option<&RateLimitConfig> {
        self.budgets.get(&category)
    }

    /// Configured budgets in declaration order of [`EventCategory::ALL`]
    pub fn iter(&self) -> impl Iterator<Item = (EventCategory, RateLimitConfig)> + '_ {
        EventCategory::ALL
            .into_iter()
            .filter_map(|c| self.budgets.get(&c).map(|config| (c, *config)))
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}

impl Default for RateLimitRegistry {
    fn default() -> Self {
        Self::empty()
            .with_budget(EventCategory::EmoteSent, EMOTE_SENT_LIMIT)
            .with_budget(EventCategory::PlayCards, PLAY_CARDS_LIMIT)
            .with_budget(EventCategory::PassTurn, PASS_TURN_LIMIT)
            .with_budget(EventCategory::GetPublicRooms, GET_PUBLIC_ROOMS_LIMIT)
            .with_budget(EventCategory::RequestSync, REQUEST_SYNC_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_every_category() {
        let registry = RateLimitRegistry::default();
        assert_eq!(registry.len(), EventCategory::ALL.len());
        assert_eq!(
            registry.policy(EventCategory::PassTurn),
            Policy::Limited(RateLimitConfig::new(5, 5_000))
        );
        assert_eq!(
            registry.get(EventCategory::GetPublicRooms),
            Some(&RateLimitConfig::new(10, 10_000))
        );
    }

    #[test]
    fn test_removed_budget_is_unlimited() {
        let registry = RateLimitRegistry::default().without(EventCategory::EmoteSent);
        assert_eq!(registry.policy(EventCategory::EmoteSent), Policy::Unlimited);
        assert!(registry.get(EventCategory::EmoteSent).is_none());
    }

    #[test]
    fn test_iter_is_ordered_and_skips_missing() {
        let registry = RateLimitRegistry::empty()
            .with_budget(EventCategory::RequestSync, REQUEST_SYNC_LIMIT)
            .with_budget(EventCategory::EmoteSent, EMOTE_SENT_LIMIT);

        let categories: Vec<EventCategory> = registry.iter().map(|(c, _)| c).collect();
        assert_eq!(
            categories,
            vec![EventCategory::EmoteSent, EventCategory::RequestSync]
        );
    }

    #[test]
    fn test_window_duration() {
        assert_eq!(PLAY_CARDS_LIMIT.window(), Duration::from_secs(5));
    }
}
