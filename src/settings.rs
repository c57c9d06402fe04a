//! Notification settings persistence and merging.
//!
//! Seven independent toggles, all defaulting to on. Settings are read
//! once at session start and only ever change through an explicit
//! update path; the notification engine never mutates them on its own.
//!
//! The persisted form uses camelCase field names. Older persisted
//! objects with missing fields merge over the defaults field-by-field,
//! so an absent toggle behaves exactly like one the user never touched.

use crate::error::Result;
use crate::storage::{KeyValueStore, load_json, save_json};
use serde::{Deserialize, Serialize};

/// Per-category and per-channel notification toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    /// Master switch; off suppresses every delivery path.
    pub enabled: bool,
    /// In-app toast surface.
    pub in_app_toasts: bool,
    /// System/browser-level notifications.
    pub browser_notifications: bool,
    /// Whether the app may prompt for notification permission.
    pub permission_nudges: bool,
    /// Budget threshold reminders.
    pub budget_reminders: bool,
    /// Savings goal reminders.
    pub goal_reminders: bool,
    /// Investment offering (IPO) reminders.
    pub ipo_reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            in_app_toasts: true,
            browser_notifications: true,
            permission_nudges: true,
            budget_reminders: true,
            goal_reminders: true,
            ipo_reminders: true,
        }
    }
}

/// Partial settings object: any subset of the toggles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub enabled: Option<bool>,
    pub in_app_toasts: Option<bool>,
    pub browser_notifications: Option<bool>,
    pub permission_nudges: Option<bool>,
    pub budget_reminders: Option<bool>,
    pub goal_reminders: Option<bool>,
    pub ipo_reminders: Option<bool>,
}

impl NotificationSettings {
    /// Merge a partial object over the defaults.
    ///
    /// Every field present in the patch overrides the default; every
    /// missing field keeps it. Pure, no I/O.
    #[must_use]
    pub fn normalize(patch: SettingsPatch) -> Self {
        Self::default().merged(patch)
    }

    /// Merge a partial object over `self`, field-by-field.
    #[must_use]
    pub fn merged(self, patch: SettingsPatch) -> Self {
        Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            in_app_toasts: patch.in_app_toasts.unwrap_or(self.in_app_toasts),
            browser_notifications: patch
                .browser_notifications
                .unwrap_or(self.browser_notifications),
            permission_nudges: patch.permission_nudges.unwrap_or(self.permission_nudges),
            budget_reminders: patch.budget_reminders.unwrap_or(self.budget_reminders),
            goal_reminders: patch.goal_reminders.unwrap_or(self.goal_reminders),
            ipo_reminders: patch.ipo_reminders.unwrap_or(self.ipo_reminders),
        }
    }

    /// Load settings from the device-local store.
    ///
    /// The stored value is read as a partial object and normalized, so
    /// a missing key, a corrupt value, and an older schema all resolve
    /// to sensible settings without failing startup.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Self {
        load_json::<SettingsPatch>(store, key)
            .map(Self::normalize)
            .unwrap_or_default()
    }

    /// Persist the full settings object.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store write fails.
    pub fn save(&self, store: &dyn KeyValueStore, key: &str) -> Result<()> {
        save_json(store, key, self)
    }
}
