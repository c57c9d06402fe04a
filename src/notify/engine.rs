//! Notification engine.
//!
//! Per-reminder decision and dispatch: settings gate, permission
//! gate, duplicate suppression, then the ordered channel fallback
//! chain. `dispatch` is infallible from the caller's perspective; the
//! worst outcome of any internal failure is a missed reminder, never
//! a crash or a surfaced error.

use crate::error::Result;
use crate::notify::channel::{DeliveryChannel, DirectChannel, WorkerChannel};
use crate::notify::dedup::{DedupCache, DedupConfig};
use crate::notify::permission::{Permission, PermissionProvider, request_permission};
use crate::notify::{AppNotification, AppNotificationInput, NotificationClick, ReminderCategory};
use crate::settings::{NotificationSettings, SettingsPatch};
use crate::storage::KeyValueStore;
use crate::worker::WorkerRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, trace, warn};

/// Store key for persisted notification settings.
pub const SETTINGS_KEY: &str = "wallet_notification_settings_v1";

/// Engine configuration. Keys and windows live here rather than as
/// ambient module globals so the engine is testable in isolation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Device-local store key for settings.
    pub settings_key: String,
    /// Device-local store key for the dedup cache.
    pub cache_key: String,
    /// Per-category dedup windows and cache bounds.
    pub dedup: DedupConfig,
    /// Icon/badge asset path attached to outgoing notifications.
    pub icon_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings_key: SETTINGS_KEY.to_owned(),
            cache_key: crate::notify::dedup::REMINDER_CACHE_KEY.to_owned(),
            dedup: DedupConfig::default(),
            icon_path: None,
        }
    }
}

/// Dedup bookkeeping behind one short-held lock.
#[derive(Default)]
struct DedupState {
    /// Loaded lazily on the first dispatch attempt.
    cache: Option<DedupCache>,
    /// Identities with a delivery attempt in progress. Reserved under
    /// the lock before delivery starts, cleared when the attempt
    /// finishes either way, so two interleaved dispatches for the same
    /// identity cannot both pass the check.
    in_flight: HashSet<String>,
}

/// Reminder delivery and deduplication engine.
pub struct NotificationEngine {
    config: EngineConfig,
    store: Arc<dyn KeyValueStore>,
    permission: Arc<dyn PermissionProvider>,
    channels: Vec<Arc<dyn DeliveryChannel>>,
    settings: std::sync::Mutex<NotificationSettings>,
    /// Never held across a channel `deliver` await: a delivery that
    /// hangs (e.g. a banner waiting for user interaction) must not
    /// block dispatches for other reminders.
    dedup: Mutex<DedupState>,
    /// Permission was already nudged this session.
    nudged: AtomicBool,
}

impl NotificationEngine {
    /// Create an engine over explicit collaborators.
    ///
    /// Channels are tried in order on each dispatch; put the most
    /// durable channel first. Settings are loaded from the store once,
    /// here.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        permission: Arc<dyn PermissionProvider>,
        channels: Vec<Arc<dyn DeliveryChannel>>,
        config: EngineConfig,
    ) -> Self {
        let settings = NotificationSettings::load(store.as_ref(), &config.settings_key);
        Self {
            config,
            store,
            permission,
            channels,
            settings: std::sync::Mutex::new(settings),
            dedup: Mutex::new(DedupState::default()),
            nudged: AtomicBool::new(false),
        }
    }

    /// Create an engine wired to the platform defaults: worker-mediated
    /// delivery first, direct Notification Center presentation second.
    /// Clicks on directly-presented notifications land on `clicks`.
    pub fn with_platform_defaults(
        store: Arc<dyn KeyValueStore>,
        registry: Arc<dyn WorkerRegistry>,
        clicks: mpsc::UnboundedSender<NotificationClick>,
        config: EngineConfig,
    ) -> Self {
        let channels: Vec<Arc<dyn DeliveryChannel>> = vec![
            Arc::new(WorkerChannel::new(registry)),
            Arc::new(DirectChannel::new(crate::platform::create_presenter(), clicks)),
        ];
        Self::new(
            store,
            crate::platform::create_permission_provider(),
            channels,
            config,
        )
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> NotificationSettings {
        self.settings
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    /// Merge a partial settings object over the current settings and
    /// persist the result. This is the only path that mutates
    /// settings.
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<NotificationSettings> {
        let updated = self.settings().merged(patch);
        updated.save(self.store.as_ref(), &self.config.settings_key)?;
        match self.settings.lock() {
            Ok(mut guard) => *guard = updated,
            Err(poisoned) => *poisoned.into_inner() = updated,
        }
        Ok(updated)
    }

    /// Whether this environment can show platform notifications.
    pub fn is_platform_notification_supported(&self) -> bool {
        self.permission.is_supported() && self.channels.iter().any(|c| c.is_available())
    }

    /// Prompt for notification permission, failing closed.
    pub async fn request_permission(&self) -> Permission {
        request_permission(self.permission.as_ref()).await
    }

    /// Resolve the effective permission for a dispatch attempt.
    ///
    /// When the state is still undecided and the user allows nudges,
    /// prompts at most once per engine instance; repeated denials are
    /// never re-prompted.
    async fn effective_permission(&self, settings: &NotificationSettings) -> Permission {
        if !self.permission.is_supported() {
            return Permission::Denied;
        }
        let current = self.permission.current().await;
        if current == Permission::Default
            && settings.permission_nudges
            && !self.nudged.swap(true, Ordering::SeqCst)
        {
            return self.request_permission().await;
        }
        current
    }

    /// Decide and deliver one reminder. Returns whether something was
    /// actually shown; on `false` the caller must not retry within the
    /// same eligibility window.
    pub async fn dispatch(&self, input: AppNotificationInput, category: ReminderCategory) -> bool {
        let settings = self.settings();
        if !settings.enabled
            || !settings.browser_notifications
            || !category_enabled(&settings, category)
        {
            trace!("reminder {} suppressed by settings", input.identity);
            return false;
        }

        if !self.is_platform_notification_supported() {
            trace!("reminder {} skipped: no platform support", input.identity);
            return false;
        }
        if self.effective_permission(&settings).await != Permission::Granted {
            debug!("reminder {} skipped: permission not granted", input.identity);
            return false;
        }

        let now = chrono::Local::now();
        let window = self.config.dedup.window_for(category);

        // Check and reserve under the lock, deliver outside it.
        {
            let mut state = self.dedup.lock().await;
            let cache = state.cache.get_or_insert_with(|| {
                DedupCache::load(self.store.as_ref(), &self.config.cache_key)
            });
            cache.prune(now, self.config.dedup.lookback_days);

            if cache.is_suppressed(&input.identity, window, now) {
                debug!("reminder {} suppressed as duplicate", input.identity);
                return false;
            }
            if !state.in_flight.insert(input.identity.clone()) {
                debug!("reminder {} already being delivered", input.identity);
                return false;
            }
        }

        let notification = AppNotification {
            title: input.title,
            body: input.body,
            tag: input.tag.or_else(|| Some(input.identity.clone())),
            url: input.url,
            icon: self.config.icon_path.clone(),
        };

        for channel in &self.channels {
            if !channel.is_available() {
                trace!("channel {} unavailable, skipping", channel.id());
                continue;
            }
            match channel.deliver(&notification).await {
                Ok(()) => {
                    let mut state = self.dedup.lock().await;
                    state.in_flight.remove(&input.identity);
                    let cache = state.cache.get_or_insert_with(|| {
                        DedupCache::load(self.store.as_ref(), &self.config.cache_key)
                    });
                    cache.record(&input.identity, now);
                    if let Err(e) = cache.save(self.store.as_ref(), &self.config.cache_key) {
                        warn!("cannot persist reminder cache: {e}");
                    }
                    info!(
                        "reminder {} delivered via {} channel",
                        input.identity,
                        channel.id()
                    );
                    return true;
                }
                Err(e) => {
                    debug!("channel {} failed for {}: {e}", channel.id(), input.identity);
                }
            }
        }

        // Every channel failed: release the reservation with no dedup
        // entry, so a later retry stays possible.
        self.dedup.lock().await.in_flight.remove(&input.identity);
        debug!("reminder {} not delivered on any channel", input.identity);
        false
    }

    /// Explicit "reset notifications": clears the dedup cache so every
    /// reminder becomes eligible again.
    pub async fn reset(&self) -> Result<()> {
        self.dedup.lock().await.cache = Some(DedupCache::default());
        self.store.remove(&self.config.cache_key)
    }
}

fn category_enabled(settings: &NotificationSettings, category: ReminderCategory) -> bool {
    match category {
        ReminderCategory::Budget => settings.budget_reminders,
        ReminderCategory::Goal => settings.goal_reminders,
        ReminderCategory::Ipo => settings.ipo_reminders,
    }
}
