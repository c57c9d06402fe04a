//! Reminder notification delivery.
//!
//! Design goal: delivery channels are pluggable. The engine owns
//! settings gating, permission state, duplicate suppression, and the
//! ordered channel fallback; channels only know how to show one
//! notification.

pub mod channel;
pub mod dedup;
pub mod engine;
pub mod permission;

pub use channel::{DeliveryChannel, DirectChannel, WorkerChannel};
pub use dedup::{DedupConfig, DedupWindow, REMINDER_CACHE_KEY};
pub use engine::{EngineConfig, NotificationEngine};
pub use permission::{Permission, PermissionProvider};

/// Platform notification payload. Constructed fresh per dispatch,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppNotification {
    pub title: String,
    pub body: String,
    /// Platform-level replacement tag.
    pub tag: Option<String>,
    /// Click-target location inside the client.
    pub url: Option<String>,
    /// Icon/badge asset path.
    pub icon: Option<String>,
}

/// Caller-supplied reminder: a stable logical identity plus the
/// human-readable content to show.
#[derive(Debug, Clone)]
pub struct AppNotificationInput {
    /// Logical identity for dedup, e.g. `"budget:groceries"` or
    /// `"ipo:XYZ-close-date"`.
    pub identity: String,
    pub title: String,
    pub body: String,
    pub tag: Option<String>,
    pub url: Option<String>,
}

/// Reminder category, each gated by its own settings toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderCategory {
    /// Budget threshold reminders.
    Budget,
    /// Savings goal reminders.
    Goal,
    /// Investment offering (IPO) reminders.
    Ipo,
}

impl std::fmt::Display for ReminderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budget => write!(f, "budget"),
            Self::Goal => write!(f, "goal"),
            Self::Ipo => write!(f, "ipo"),
        }
    }
}

/// Click on a directly-presented notification. The shell consumes
/// these to focus the window and navigate to the reminder's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationClick {
    pub url: String,
}
