//! Full update cycle: detection, apply, and the one-shot success
//! report across the relaunch boundary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_stream::StreamExt;
use wallet_reminders::update::controller::UPDATE_SUCCESS_KEY;
use wallet_reminders::worker::WorkerRegistry;
use wallet_reminders::{
    JsonFileStore, KeyValueStore, UpdateConfig, UpdateController, take_update_success,
};

struct StagedRegistry {
    waiting: std::sync::Mutex<Option<String>>,
    activations: AtomicUsize,
    relaunches: AtomicUsize,
}

impl StagedRegistry {
    fn new(version: &str) -> Arc<Self> {
        Arc::new(Self {
            waiting: std::sync::Mutex::new(Some(version.to_owned())),
            activations: AtomicUsize::new(0),
            relaunches: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl WorkerRegistry for StagedRegistry {
    fn is_supported(&self) -> bool {
        true
    }

    fn has_active_worker(&self) -> bool {
        true
    }

    async fn waiting_version(&self) -> anyhow::Result<Option<String>> {
        Ok(self.waiting.lock().unwrap().clone())
    }

    async fn activate_waiting(&self) -> anyhow::Result<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        *self.waiting.lock().unwrap() = None;
        Ok(())
    }

    async fn request_relaunch(&self) -> anyhow::Result<()> {
        self.relaunches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn show_notification(
        &self,
        _n: &wallet_reminders::AppNotification,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn update_cycle_reports_success_exactly_once_across_relaunch() {
    // Session-scoped storage: survives the controller-initiated
    // relaunch (same directory), not a fresh session.
    let session_dir = tempfile::tempdir().unwrap();

    // --- First "session": detect and apply the update. ---
    {
        let session: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(session_dir.path()));
        let registry = StagedRegistry::new("2.4.0");
        let controller = UpdateController::new(
            Arc::clone(&registry) as Arc<dyn WorkerRegistry>,
            Arc::clone(&session),
            UpdateConfig::default(),
        );

        let mut snapshots = controller.watch_stream();
        assert!(!snapshots.next().await.unwrap().update_available);

        controller.poll_once().await;
        let state = snapshots.next().await.unwrap();
        assert!(state.waiting_version_present);
        assert!(state.update_available);

        // User confirms; repeat clicks must not double-apply.
        controller.apply_update().await;
        controller.apply_update().await;
        assert_eq!(registry.activations.load(Ordering::SeqCst), 1);
        assert_eq!(registry.relaunches.load(Ordering::SeqCst), 1);
        assert!(controller.state().applied);

        // The flag is on disk before the process goes away.
        assert!(session.get(UPDATE_SUCCESS_KEY).is_some());
    }
    // Controller dropped: the relaunch tore the process down.

    // --- Second "session": startup check over the same session dir. ---
    let session = JsonFileStore::new(session_dir.path());
    assert!(take_update_success(&session, UPDATE_SUCCESS_KEY));
    // Exactly once: the flag is gone on every later check.
    assert!(!take_update_success(&session, UPDATE_SUCCESS_KEY));
    assert!(session.get(UPDATE_SUCCESS_KEY).is_none());
}

#[tokio::test]
async fn fresh_session_without_update_reports_nothing() {
    let session_dir = tempfile::tempdir().unwrap();
    let session = JsonFileStore::new(session_dir.path());
    assert!(!take_update_success(&session, UPDATE_SUCCESS_KEY));
}
