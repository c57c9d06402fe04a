//! Update lifecycle controller.
//!
//! Owns the [`UpdateState`] snapshot and publishes it over a
//! `tokio::sync::watch` channel: subscribing is cheap, restartable,
//! and every subscriber sees the latest snapshot plus all later
//! transitions. The controller's own memory dies with the relaunch it
//! triggers, so "update applied" is reported through a one-shot flag
//! in session-scoped storage, read and cleared once at next startup.

use crate::storage::KeyValueStore;
use crate::worker::WorkerRegistry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

/// Session storage key for the one-shot update-success flag.
pub const UPDATE_SUCCESS_KEY: &str = "sw_update_success";

/// Interval between waiting-worker polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Read-only update snapshot exposed to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct UpdateState {
    /// Whether the environment has worker support at all. `false` is
    /// terminal: no update capability, nothing else will change.
    pub supported: bool,
    /// A newer worker is staged and waiting to activate.
    pub waiting_version_present: bool,
    /// An update can be applied. Consumers render a one-time notice on
    /// the false→true transition.
    pub update_available: bool,
    /// `apply_update` has run; a relaunch is imminent.
    pub applied: bool,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self {
            supported: true,
            waiting_version_present: false,
            update_available: false,
            applied: false,
        }
    }
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Session storage key for the one-shot success flag.
    pub success_flag_key: String,
    /// How often the background poller queries the registry.
    pub poll_interval: Duration,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            success_flag_key: UPDATE_SUCCESS_KEY.to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Tracks the worker registration for the lifetime of the session.
pub struct UpdateController {
    registry: Arc<dyn WorkerRegistry>,
    session: Arc<dyn KeyValueStore>,
    config: UpdateConfig,
    state_tx: watch::Sender<UpdateState>,
    /// Guards against duplicate relaunches when `apply_update` is
    /// called repeatedly before the relaunch lands.
    apply_in_flight: AtomicBool,
}

impl UpdateController {
    /// Create a controller over the given registry and session store.
    pub fn new(
        registry: Arc<dyn WorkerRegistry>,
        session: Arc<dyn KeyValueStore>,
        config: UpdateConfig,
    ) -> Self {
        let initial = UpdateState {
            supported: registry.is_supported(),
            ..Default::default()
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            registry,
            session,
            config,
            state_tx,
            apply_in_flight: AtomicBool::new(false),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> UpdateState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state transitions. May be called any number of
    /// times; each receiver starts from the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<UpdateState> {
        self.state_tx.subscribe()
    }

    /// Subscribe as a `Stream` of snapshots.
    pub fn watch_stream(&self) -> WatchStream<UpdateState> {
        WatchStream::new(self.subscribe())
    }

    /// Query the registry once and fold the answer into the snapshot.
    ///
    /// Registry errors are swallowed and treated as "no update
    /// available"; the controller never surfaces transport errors.
    pub async fn poll_once(&self) {
        if !self.state().supported {
            return;
        }

        let waiting = match self.registry.waiting_version().await {
            Ok(version) => version,
            Err(e) => {
                debug!("worker registration query failed, assuming no update: {e}");
                None
            }
        };

        self.state_tx.send_if_modified(|state| {
            let present = waiting.is_some();
            if state.waiting_version_present == present && state.update_available == present {
                return false;
            }
            state.waiting_version_present = present;
            state.update_available = present;
            true
        });

        if let Some(version) = waiting {
            debug!("worker version {version} waiting to activate");
        }
    }

    /// Spawn the periodic poll loop. Returns immediately when the
    /// environment has no update capability.
    pub fn spawn_poller(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if !self.state().supported {
                debug!("no worker support, update poller exiting");
                return;
            }
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            loop {
                ticker.tick().await;
                self.poll_once().await;
            }
        })
    }

    /// Activate the waiting worker and relaunch the client.
    ///
    /// Idempotent: repeat calls before the relaunch completes are
    /// no-ops. The one-shot success flag is written to session storage
    /// *before* the relaunch is requested, because this process does
    /// not survive to report afterwards. Activation failure releases
    /// the guard and removes the flag so a later attempt can retry.
    pub async fn apply_update(&self) {
        if !self.state().supported {
            debug!("apply_update ignored: no worker support");
            return;
        }
        if !self.state().waiting_version_present {
            debug!("apply_update ignored: no worker waiting");
            return;
        }
        if self.apply_in_flight.swap(true, Ordering::SeqCst) {
            debug!("apply_update ignored: already in flight");
            return;
        }

        if let Err(e) = self.session.set(&self.config.success_flag_key, "1") {
            // Worst case the success toast is lost after relaunch.
            warn!("cannot write update-success flag: {e}");
        }

        match self.registry.activate_waiting().await {
            Ok(()) => {
                self.state_tx.send_modify(|state| state.applied = true);
                info!("waiting worker activated, requesting relaunch");
                if let Err(e) = self.registry.request_relaunch().await {
                    warn!("relaunch request failed: {e}");
                }
            }
            Err(e) => {
                warn!("worker activation failed: {e}");
                let _ = self.session.remove(&self.config.success_flag_key);
                self.apply_in_flight.store(false, Ordering::SeqCst);
            }
        }
    }
}

/// Startup check for the one-shot update-success flag.
///
/// Returns `true` at most once per update cycle: the flag is cleared
/// on the first read and stays absent until the next `apply_update`.
pub fn take_update_success(session: &dyn KeyValueStore, key: &str) -> bool {
    if session.get(key).is_none() {
        return false;
    }
    if let Err(e) = session.remove(key) {
        warn!("cannot clear update-success flag: {e}");
    }
    true
}
