//! Platform-specific notification display and permission.
//!
//! Provides cross-platform [`NotificationPresenter`] and permission
//! seams. On macOS, Notification Center is used via
//! `mac-notification-sys`. On other platforms, a no-op stub reports
//! "no capability" — treated everywhere as a normal silent path,
//! never an error.

use crate::notify::AppNotification;
use crate::notify::permission::PermissionProvider;
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod stub;
// Re-export stub for tests on all platforms.
#[cfg(test)]
#[cfg(target_os = "macos")]
#[path = "stub.rs"]
mod stub;

/// What happened to a directly-presented notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// Shown; the user did not interact with it.
    Shown,
    /// The user clicked the notification or its action button.
    Clicked,
}

/// Foreground notification display seam.
#[async_trait]
pub trait NotificationPresenter: Send + Sync {
    /// Whether this platform can display notifications at all.
    fn is_supported(&self) -> bool;

    /// Display the notification and report how it was resolved.
    async fn present(&self, notification: &AppNotification) -> anyhow::Result<PresentOutcome>;
}

/// Create the platform-appropriate presenter.
pub fn create_presenter() -> Arc<dyn NotificationPresenter> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacOsPresenter::new())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(stub::StubPresenter)
    }
}

/// Create the platform-appropriate permission provider.
pub fn create_permission_provider() -> Arc<dyn PermissionProvider> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacOsPermissionProvider)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(stub::StubPermissionProvider)
    }
}
