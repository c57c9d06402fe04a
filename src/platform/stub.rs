//! No-op presenter and permission provider for platforms without
//! notification support.

use super::{NotificationPresenter, PresentOutcome};
use crate::notify::AppNotification;
use crate::notify::permission::{Permission, PermissionProvider};
use async_trait::async_trait;

/// Stub presenter that reports no capability.
///
/// Used on platforms without a notification backend. Delivery
/// attempts fail so the engine's fallback chain moves on; capability
/// probes report `false` so callers can skip the attempt entirely.
pub struct StubPresenter;

#[async_trait]
impl NotificationPresenter for StubPresenter {
    fn is_supported(&self) -> bool {
        false
    }

    async fn present(&self, _notification: &AppNotification) -> anyhow::Result<PresentOutcome> {
        anyhow::bail!("platform notifications are not supported on this platform")
    }
}

/// Stub permission provider: always denied, never prompts.
pub struct StubPermissionProvider;

#[async_trait]
impl PermissionProvider for StubPermissionProvider {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current(&self) -> Permission {
        Permission::Denied
    }

    async fn request(&self) -> anyhow::Result<Permission> {
        Ok(Permission::Denied)
    }
}
