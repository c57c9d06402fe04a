//! Delivery channels.
//!
//! The engine holds an ordered list of channels and tries each until
//! one succeeds. Worker-mediated delivery comes first because it
//! persists the notification at the platform level and survives the
//! foreground window; direct presentation is a best-effort fallback
//! for environments without an active worker.

use crate::notify::{AppNotification, NotificationClick};
use crate::platform::{NotificationPresenter, PresentOutcome};
use crate::worker::WorkerRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// One way of surfacing a notification. New channels only need to
/// implement this trait.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Stable channel identifier (e.g. `worker`, `direct`).
    fn id(&self) -> &'static str;

    /// Cheap capability probe; unavailable channels are skipped
    /// without counting as failures.
    fn is_available(&self) -> bool;

    /// Attempt to show the notification.
    async fn deliver(&self, notification: &AppNotification) -> anyhow::Result<()>;
}

/// Worker-mediated delivery through the background worker
/// registration. Notifications shown this way outlive the page.
pub struct WorkerChannel {
    registry: Arc<dyn WorkerRegistry>,
}

impl WorkerChannel {
    /// Create a channel over the given registry.
    pub fn new(registry: Arc<dyn WorkerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl DeliveryChannel for WorkerChannel {
    fn id(&self) -> &'static str {
        "worker"
    }

    fn is_available(&self) -> bool {
        self.registry.is_supported() && self.registry.has_active_worker()
    }

    async fn deliver(&self, notification: &AppNotification) -> anyhow::Result<()> {
        self.registry.show_notification(notification).await
    }
}

/// Direct foreground presentation. Clicks are forwarded as
/// [`NotificationClick`] events so the shell can focus the window and
/// navigate to the reminder's target.
pub struct DirectChannel {
    presenter: Arc<dyn NotificationPresenter>,
    clicks: mpsc::UnboundedSender<NotificationClick>,
}

impl DirectChannel {
    /// Create a channel over the given presenter; clicks land on
    /// `clicks`.
    pub fn new(
        presenter: Arc<dyn NotificationPresenter>,
        clicks: mpsc::UnboundedSender<NotificationClick>,
    ) -> Self {
        Self { presenter, clicks }
    }
}

#[async_trait]
impl DeliveryChannel for DirectChannel {
    fn id(&self) -> &'static str {
        "direct"
    }

    fn is_available(&self) -> bool {
        self.presenter.is_supported()
    }

    async fn deliver(&self, notification: &AppNotification) -> anyhow::Result<()> {
        let outcome = self.presenter.present(notification).await?;
        if outcome == PresentOutcome::Clicked {
            if let Some(url) = &notification.url {
                // Shell gone means nowhere to navigate; not a failure.
                if self.clicks.send(NotificationClick { url: url.clone() }).is_err() {
                    debug!("click receiver dropped, ignoring notification click");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    struct ClickingPresenter;

    #[async_trait]
    impl NotificationPresenter for ClickingPresenter {
        fn is_supported(&self) -> bool {
            true
        }

        async fn present(&self, _n: &AppNotification) -> anyhow::Result<PresentOutcome> {
            Ok(PresentOutcome::Clicked)
        }
    }

    struct QuietPresenter;

    #[async_trait]
    impl NotificationPresenter for QuietPresenter {
        fn is_supported(&self) -> bool {
            true
        }

        async fn present(&self, _n: &AppNotification) -> anyhow::Result<PresentOutcome> {
            Ok(PresentOutcome::Shown)
        }
    }

    fn reminder(url: Option<&str>) -> AppNotification {
        AppNotification {
            title: "Goal reached".to_owned(),
            body: "Emergency fund is at 100%".to_owned(),
            tag: Some("goal:emergency-fund".to_owned()),
            url: url.map(str::to_owned),
            icon: None,
        }
    }

    #[tokio::test]
    async fn direct_channel_forwards_click_target() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = DirectChannel::new(Arc::new(ClickingPresenter), tx);

        channel
            .deliver(&reminder(Some("/goals/emergency-fund")))
            .await
            .unwrap();

        let click = rx.recv().await.unwrap();
        assert_eq!(click.url, "/goals/emergency-fund");
    }

    #[tokio::test]
    async fn direct_channel_ignores_click_without_target() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = DirectChannel::new(Arc::new(ClickingPresenter), tx);

        channel.deliver(&reminder(None)).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn direct_channel_unclicked_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = DirectChannel::new(Arc::new(QuietPresenter), tx);

        channel
            .deliver(&reminder(Some("/goals/emergency-fund")))
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn direct_channel_survives_dropped_click_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let channel = DirectChannel::new(Arc::new(ClickingPresenter), tx);

        assert!(channel.deliver(&reminder(Some("/goals"))).await.is_ok());
    }

    #[tokio::test]
    async fn worker_channel_availability_follows_registry() {
        let channel = WorkerChannel::new(Arc::new(crate::worker::NoopWorkerRegistry));
        assert!(!channel.is_available());
        assert!(channel.deliver(&reminder(None)).await.is_err());
    }
}
