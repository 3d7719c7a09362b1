//! Sliding-window timestamp store

use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::category::EventCategory;
use super::limiter::{Decision, RateLimitStatus};
use super::registry::{RateLimitConfig, RateLimitRegistry};

/// Acceptance timestamps for one (identifier, category) pair, oldest first
#[derive(Debug, Clone, Default)]
pub struct RateLimitEntry {
    timestamps: VecDeque<u64>,
}

impl RateLimitEntry {
    /// Drop every timestamp `t <= now - window_ms`.
    ///
    /// A timestamp sitting exactly on the boundary counts as expired.
    pub fn prune(&mut self, now: u64, window_ms: u64) {
        let Some(cutoff) = now.checked_sub(window_ms) else {
            return;
        };
        while self.timestamps.front().is_some_and(|&t| t <= cutoff) {
            self.timestamps.pop_front();
        }
    }

    /// Prune, then either record `now` or report how long until a slot frees up.
    /// A denial records nothing.
    pub fn try_admit(&mut self, config: &RateLimitConfig, now: u64) -> Decision {
        self.prune(now, config.window_ms);

        if self.timestamps.len() >= config.max_requests {
            let oldest = self.timestamps.front().copied().unwrap_or(now);
            let retry_after_ms = oldest.saturating_add(config.window_ms).saturating_sub(now);
            return Decision::Denied {
                retry_after: Duration::from_millis(retry_after_ms),
            };
        }

        self.timestamps.push_back(now);
        Decision::Allowed
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn oldest(&self) -> Option<u64> {
        self.timestamps.front().copied()
    }
}

type CategoryEntries = HashMap<EventCategory, RateLimitEntry>;

/// identifier -> category -> entry.
///
/// Each identifier's sub-map is only touched while its shard lock is held,
/// so a check is an atomic read-modify-write per identifier.
#[derive(Debug, Default)]
pub struct RateLimitStore {
    entries: DashMap<String, CategoryEntries>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(
        &self,
        identifier: &str,
        category: EventCategory,
        config: &RateLimitConfig,
        now: u64,
    ) -> Decision {
        if let Some(mut categories) = self.entries.get_mut(identifier) {
            return categories
                .entry(category)
                .or_default()
                .try_admit(config, now);
        }

        self.entries
            .entry(identifier.to_string())
            .or_default()
            .entry(category)
            .or_default()
            .try_admit(config, now)
    }

    /// Prunes the entry if it exists; never creates state
    pub fn status(
        &self,
        identifier: &str,
        category: EventCategory,
        config: &RateLimitConfig,
        now: u64,
    ) -> RateLimitStatus {
        let (count, oldest_timestamp) = self
            .entries
            .get_mut(identifier)
            .and_then(|mut categories| {
                categories.get_mut(&category).map(|entry| {
                    entry.prune(now, config.window_ms);
                    (entry.len(), entry.oldest())
                })
            })
            .unwrap_or((0, None));

        RateLimitStatus {
            count,
            max_requests: config.max_requests,
            window_ms: config.window_ms,
            oldest_timestamp,
        }
    }

    /// Returns true if the identifier had any state
    pub fn remove(&self, identifier: &str) -> bool {
        self.entries.remove(identifier).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Prune every entry and drop identifiers left with nothing in the window.
    /// Returns how many identifiers were dropped.
    pub fn sweep(&self, registry: &RateLimitRegistry, now: u64) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, categories| {
            categories.retain(|category, entry| match registry.get(*category) {
                Some(config) => {
                    entry.prune(now, config.window_ms);
                    !entry.is_empty()
                }
                None => false,
            });

            let keep = !categories.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: RateLimitConfig = RateLimitConfig::new(3, 1_000);

    #[test]
    fn test_prune_is_strict_at_boundary() {
        let mut entry = RateLimitEntry::default();
        assert!(entry.try_admit(&BUDGET, 0).is_allowed());
        assert!(entry.try_admit(&BUDGET, 1).is_allowed());

        // cutoff = 1000 - 1000 = 0, so t=0 goes and t=1 stays
        entry.prune(1_000, BUDGET.window_ms);
        assert_eq!(entry.len(), 1);
        assert_eq!(entry.oldest(), Some(1));
    }

    #[test]
    fn test_prune_before_window_elapsed_is_noop() {
        let mut entry = RateLimitEntry::default();
        entry.try_admit(&BUDGET, 0);
        entry.prune(500, BUDGET.window_ms);
        assert_eq!(entry.len(), 1);
    }

    #[test]
    fn test_denial_does_not_record() {
        let mut entry = RateLimitEntry::default();
        for t in [10, 20, 30] {
            assert!(entry.try_admit(&BUDGET, t).is_allowed());
        }

        let decision = entry.try_admit(&BUDGET, 40);
        assert_eq!(
            decision,
            Decision::Denied {
                retry_after: Duration::from_millis(970)
            }
        );
        assert_eq!(entry.len(), 3);
    }

    #[test]
    fn test_store_keeps_identifiers_apart() {
        let store = RateLimitStore::new();
        for t in 0..3 {
            assert!(store.admit("a", EventCategory::PassTurn, &BUDGET, t).is_allowed());
        }
        assert!(!store.admit("a", EventCategory::PassTurn, &BUDGET, 3).is_allowed());
        assert!(store.admit("b", EventCategory::PassTurn, &BUDGET, 3).is_allowed());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_status_does_not_create_state() {
        let store = RateLimitStore::new();
        let status = store.status("ghost", EventCategory::PlayCards, &BUDGET, 0);
        assert_eq!(status.count, 0);
        assert_eq!(status.oldest_timestamp, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_drops_only_idle_identifiers() {
        let registry = RateLimitRegistry::empty()
            .with_budget(EventCategory::PassTurn, BUDGET)
            .with_budget(EventCategory::EmoteSent, RateLimitConfig::new(3, 10_000));
        let store = RateLimitStore::new();

        store.admit("idle", EventCategory::PassTurn, &BUDGET, 0);
        store.admit("active", EventCategory::PassTurn, &BUDGET, 1_500);
        store.admit(
            "long_window",
            EventCategory::EmoteSent,
            &RateLimitConfig::new(3, 10_000),
            0,
        );

        let removed = store.sweep(&registry, 2_000);
        assert_eq!(removed, 1);
        assert!(!store.contains("idle"));
        assert!(store.contains("active"));
        assert!(store.contains("long_window"));
    }

    #[test]
    fn test_huge_window_denies_without_overflow() {
        let budget = RateLimitConfig::new(1, u64::MAX);
        let mut entry = RateLimitEntry::default();

        assert!(entry.try_admit(&budget, 5).is_allowed());
        assert_eq!(
            entry.try_admit(&budget, 10),
            Decision::Denied {
                retry_after: Duration::from_millis(u64::MAX - 10)
            }
        );
        assert_eq!(entry.len(), 1);
    }

    #[test]
    fn test_remove_reports_presence() {
        let store = RateLimitStore::new();
        store.admit("p1", EventCategory::PassTurn, &BUDGET, 0);
        assert!(store.remove("p1"));
        assert!(!store.remove("p1"));
    }
}
