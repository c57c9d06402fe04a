//! Background worker registration seam.
//!
//! The Wallet client keeps its cached program logic fresh through a
//! background worker that stages new versions and can display
//! notifications that outlive the foreground window. This module is
//! the trait boundary to that platform facility: the embedding shell
//! supplies the real registration handle, and everything here stays
//! testable with fakes.

use crate::notify::AppNotification;
use async_trait::async_trait;

/// Handle to the platform worker registration.
///
/// All fallible operations return `anyhow::Result`; callers in this
/// crate swallow and log failures rather than surfacing them.
#[async_trait]
pub trait WorkerRegistry: Send + Sync {
    /// Whether the platform supports background workers at all.
    fn is_supported(&self) -> bool;

    /// Whether a worker is currently active and able to mediate
    /// notification display.
    fn has_active_worker(&self) -> bool;

    /// Version of a newer worker staged and waiting to activate, if any.
    async fn waiting_version(&self) -> anyhow::Result<Option<String>>;

    /// Instruct the waiting worker to take control immediately,
    /// skipping the normal staged rollout.
    async fn activate_waiting(&self) -> anyhow::Result<()>;

    /// Ask the shell to relaunch the client so the activated worker
    /// serves the new program logic.
    async fn request_relaunch(&self) -> anyhow::Result<()>;

    /// Display a notification through the worker. Survives the
    /// foreground window being closed.
    async fn show_notification(&self, notification: &AppNotification) -> anyhow::Result<()>;
}

/// Registry for environments without worker support.
///
/// Reports no capability; every operation is a silent no-op.
pub struct NoopWorkerRegistry;

#[async_trait]
impl WorkerRegistry for NoopWorkerRegistry {
    fn is_supported(&self) -> bool {
        false
    }

    fn has_active_worker(&self) -> bool {
        false
    }

    async fn waiting_version(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn activate_waiting(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn request_relaunch(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn show_notification(&self, _notification: &AppNotification) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("worker notifications unsupported"))
    }
}
