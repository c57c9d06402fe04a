//! Wallet reminders: user-facing reminder delivery and client update
//! lifecycle for the Wallet personal-finance client.
//!
//! Two cooperating components share one invariant (never surface a
//! signal more than the user allowed):
//!
//! - **Update controller** ([`update`]): tracks the background worker
//!   registration for a newer staged version, applies it on demand,
//!   and reports success exactly once after the relaunch it caused.
//! - **Notification engine** ([`notify`]): resolves settings and
//!   permission state into a per-reminder delivery decision, dispatches
//!   through an ordered channel chain (worker-mediated first, direct
//!   presentation as fallback), and suppresses duplicates within each
//!   reminder's eligibility window.
//!
//! The platform collaborators (worker registration, notification
//! display, permission prompt, storage backing) are trait seams
//! supplied by the embedding shell; see [`worker`], [`platform`], and
//! [`storage`].

pub mod error;
pub mod notify;
pub mod platform;
pub mod settings;
pub mod storage;
pub mod update;
pub mod worker;

pub use error::{Result, WalletError};
pub use notify::engine::{EngineConfig, NotificationEngine};
pub use notify::{
    AppNotification, AppNotificationInput, DedupConfig, DedupWindow, NotificationClick, Permission,
    ReminderCategory,
};
pub use settings::{NotificationSettings, SettingsPatch};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use update::{UpdateConfig, UpdateController, UpdateState, take_update_success};

/// Initialize stderr tracing with `RUST_LOG` filtering (default
/// `info`). Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
