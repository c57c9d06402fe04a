//! Reminder duplicate suppression.
//!
//! A single versioned cache (store key `wallet_reminder_cache_v1`)
//! maps each reminder's logical identity to when it last fired.
//! Window policy is configuration, not dispatch logic: budget and
//! goal reminders fire at most once per calendar day per subject, IPO
//! reminders once per distinct offering event. Entries outside the
//! lookback window are pruned on access so the cache never grows
//! unbounded; a missing or unparsable stored cache is simply empty.

use crate::error::Result;
use crate::notify::ReminderCategory;
use crate::storage::{KeyValueStore, load_json, save_json};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Versioned store key for the reminder dedup cache. Bumping the
/// suffix abandons the old format without a migration.
pub const REMINDER_CACHE_KEY: &str = "wallet_reminder_cache_v1";

/// Default prune lookback, longer than any reminder period in use.
const DEFAULT_LOOKBACK_DAYS: i64 = 45;

/// Eligibility window for one reminder category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupWindow {
    /// At most once per calendar day per subject.
    CalendarDay,
    /// At most once per distinct event (the identity carries the
    /// event, e.g. `ipo:XYZ-close-date`).
    PerEvent,
}

/// Window policy per category plus cache housekeeping bounds.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub budget_window: DedupWindow,
    pub goal_window: DedupWindow,
    pub ipo_window: DedupWindow,
    /// Entries last fired more than this many days ago are pruned.
    pub lookback_days: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            budget_window: DedupWindow::CalendarDay,
            goal_window: DedupWindow::CalendarDay,
            ipo_window: DedupWindow::PerEvent,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl DedupConfig {
    /// Window for a category.
    #[must_use]
    pub fn window_for(&self, category: ReminderCategory) -> DedupWindow {
        match category {
            ReminderCategory::Budget => self.budget_window,
            ReminderCategory::Goal => self.goal_window,
            ReminderCategory::Ipo => self.ipo_window,
        }
    }
}

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupEntry {
    /// Unix timestamp (seconds) of the delivery.
    pub fired_at: i64,
    /// Period key at delivery time (`YYYY-MM-DD`).
    pub period_key: String,
}

/// In-memory cache image, persisted as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupCache {
    #[serde(default)]
    entries: HashMap<String, DedupEntry>,
}

fn day_key(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}

impl DedupCache {
    /// Load the cache from the store; absence and corruption both
    /// yield an empty cache.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Self {
        load_json(store, key).unwrap_or_default()
    }

    /// Persist the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn save(&self, store: &dyn KeyValueStore, key: &str) -> Result<()> {
        save_json(store, key, self)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `identity` already fired inside its current window.
    #[must_use]
    pub fn is_suppressed(&self, identity: &str, window: DedupWindow, now: DateTime<Local>) -> bool {
        match self.entries.get(identity) {
            None => false,
            Some(entry) => match window {
                DedupWindow::PerEvent => true,
                DedupWindow::CalendarDay => entry.period_key == day_key(now),
            },
        }
    }

    /// Record a successful delivery for `identity`.
    pub fn record(&mut self, identity: &str, now: DateTime<Local>) {
        self.entries.insert(
            identity.to_owned(),
            DedupEntry {
                fired_at: now.timestamp(),
                period_key: day_key(now),
            },
        );
    }

    /// Drop entries last fired more than `lookback_days` ago.
    /// Returns whether anything was removed.
    pub fn prune(&mut self, now: DateTime<Local>, lookback_days: i64) -> bool {
        let cutoff = now.timestamp() - lookback_days * 24 * 3600;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.fired_at >= cutoff);
        self.entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    #[test]
    fn unknown_identity_is_not_suppressed() {
        let cache = DedupCache::default();
        let now = Local::now();
        assert!(!cache.is_suppressed("budget:groceries", DedupWindow::CalendarDay, now));
        assert!(!cache.is_suppressed("ipo:xyz", DedupWindow::PerEvent, now));
    }

    #[test]
    fn calendar_day_suppresses_same_day_only() {
        let mut cache = DedupCache::default();
        let now = Local::now();
        cache.record("budget:groceries", now);

        assert!(cache.is_suppressed("budget:groceries", DedupWindow::CalendarDay, now));
        // Next day the same subject is eligible again.
        let tomorrow = now + Duration::days(1);
        assert!(!cache.is_suppressed("budget:groceries", DedupWindow::CalendarDay, tomorrow));
    }

    #[test]
    fn per_event_suppresses_regardless_of_day() {
        let mut cache = DedupCache::default();
        let now = Local::now();
        cache.record("ipo:XYZ-close-date", now);

        let next_week = now + Duration::days(7);
        assert!(cache.is_suppressed("ipo:XYZ-close-date", DedupWindow::PerEvent, next_week));
        // A different offering event is its own identity.
        assert!(!cache.is_suppressed("ipo:ABC-close-date", DedupWindow::PerEvent, next_week));
    }

    #[test]
    fn prune_removes_entries_outside_lookback() {
        let mut cache = DedupCache::default();
        let now = Local::now();
        cache.record("budget:groceries", now - Duration::days(60));
        cache.record("goal:house", now);

        assert!(cache.prune(now, 45));
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_suppressed("budget:groceries", DedupWindow::CalendarDay, now));
        // Pruning again changes nothing.
        assert!(!cache.prune(now, 45));
    }

    #[test]
    fn load_treats_missing_and_corrupt_as_empty() {
        let store = MemoryStore::new();
        assert!(DedupCache::load(&store, REMINDER_CACHE_KEY).is_empty());

        store.set(REMINDER_CACHE_KEY, "{half a document").unwrap();
        assert!(DedupCache::load(&store, REMINDER_CACHE_KEY).is_empty());
    }

    #[test]
    fn save_then_load_round_trip() {
        let store = MemoryStore::new();
        let mut cache = DedupCache::default();
        let now = Local::now();
        cache.record("budget:groceries", now);
        cache.save(&store, REMINDER_CACHE_KEY).unwrap();

        let restored = DedupCache::load(&store, REMINDER_CACHE_KEY);
        assert!(restored.is_suppressed("budget:groceries", DedupWindow::CalendarDay, now));
    }

    #[test]
    fn default_config_windows() {
        let config = DedupConfig::default();
        assert_eq!(
            config.window_for(ReminderCategory::Budget),
            DedupWindow::CalendarDay
        );
        assert_eq!(
            config.window_for(ReminderCategory::Goal),
            DedupWindow::CalendarDay
        );
        assert_eq!(
            config.window_for(ReminderCategory::Ipo),
            DedupWindow::PerEvent
        );
        assert_eq!(config.lookback_days, 45);
    }

    #[test]
    fn record_overwrites_previous_entry() {
        let mut cache = DedupCache::default();
        let yesterday = Local::now() - Duration::days(1);
        let now = Local::now();
        cache.record("goal:house", yesterday);
        cache.record("goal:house", now);
        assert_eq!(cache.len(), 1);
        assert!(cache.is_suppressed("goal:house", DedupWindow::CalendarDay, now));
    }
}
