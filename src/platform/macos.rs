//! macOS Notification Center presenter.
//!
//! Uses `mac-notification-sys` to post banner notifications and wait
//! for the user's response, so clicks can be routed back into the
//! client. Notification Center manages authorization per app bundle
//! itself (the OS shows its own prompt on first delivery), so the
//! permission provider reports granted without prompting.

use super::{NotificationPresenter, PresentOutcome};
use crate::notify::AppNotification;
use crate::notify::permission::{Permission, PermissionProvider};
use async_trait::async_trait;
use mac_notification_sys::{MainButton, Notification, NotificationResponse};

/// Bundle identifiers tried when binding the notification sender.
/// Falls back to system bundles in unbundled dev runs.
const BUNDLE_ID_CANDIDATES: [&str; 3] =
    ["com.wallet.desktop", "com.apple.Terminal", "com.apple.Finder"];

fn ensure_notification_application() {
    static INIT_NOTIFICATION_APP: std::sync::Once = std::sync::Once::new();
    INIT_NOTIFICATION_APP.call_once(|| {
        for bundle_id in BUNDLE_ID_CANDIDATES {
            match mac_notification_sys::set_application(bundle_id) {
                Ok(_) => return,
                Err(e) => {
                    tracing::debug!("cannot bind notification bundle id {bundle_id}: {e}");
                }
            }
        }
    });
}

/// Notification Center presenter.
pub struct MacOsPresenter;

impl MacOsPresenter {
    /// Create a new presenter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacOsPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPresenter for MacOsPresenter {
    fn is_supported(&self) -> bool {
        true
    }

    async fn present(&self, notification: &AppNotification) -> anyhow::Result<PresentOutcome> {
        let payload = notification.clone();
        // `send()` blocks until the banner is resolved when waiting
        // for a click, so it runs on the blocking pool.
        tokio::task::spawn_blocking(move || {
            ensure_notification_application();

            let mut banner = Notification::new();
            banner
                .title(&payload.title)
                .message(&payload.body)
                .main_button(MainButton::SingleAction("Open"))
                .close_button("Dismiss")
                .default_sound()
                .wait_for_click(true)
                .asynchronous(false);
            if let Some(icon) = payload.icon.as_deref() {
                banner.app_icon(icon);
            }

            match banner.send() {
                Ok(NotificationResponse::Click) | Ok(NotificationResponse::ActionButton(_)) => {
                    Ok(PresentOutcome::Clicked)
                }
                Ok(_) => Ok(PresentOutcome::Shown),
                Err(e) => Err(anyhow::anyhow!("notification send failed: {e}")),
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!("notification task failed: {e}"))?
    }
}

/// Permission provider backed by Notification Center's own
/// per-bundle authorization.
pub struct MacOsPermissionProvider;

#[async_trait]
impl PermissionProvider for MacOsPermissionProvider {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current(&self) -> Permission {
        Permission::Granted
    }

    async fn request(&self) -> anyhow::Result<Permission> {
        Ok(Permission::Granted)
    }
}
