//! Notification permission state.
//!
//! The provider seam maps onto the platform permission prompt. The
//! crate never assumes permission: an unsupported provider or a
//! failed prompt both resolve to [`Permission::Denied`].

use async_trait::async_trait;
use tracing::debug;

/// Platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The user granted notification display.
    Granted,
    /// The user denied notification display.
    Denied,
    /// The user has not decided yet; a prompt may be shown.
    Default,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Platform permission seam.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Whether the platform exposes a notification permission at all.
    fn is_supported(&self) -> bool;

    /// Current permission state, without prompting.
    async fn current(&self) -> Permission;

    /// Show the platform permission prompt.
    async fn request(&self) -> anyhow::Result<Permission>;
}

/// Prompt for permission, failing closed.
///
/// Returns `Denied` when the platform is unsupported or the prompt
/// errors; never panics and never surfaces the error.
pub async fn request_permission(provider: &dyn PermissionProvider) -> Permission {
    if !provider.is_supported() {
        return Permission::Denied;
    }
    match provider.request().await {
        Ok(state) => state,
        Err(e) => {
            debug!("permission request failed, treating as denied: {e}");
            Permission::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    struct Unsupported;

    #[async_trait]
    impl PermissionProvider for Unsupported {
        fn is_supported(&self) -> bool {
            false
        }

        async fn current(&self) -> Permission {
            Permission::Denied
        }

        async fn request(&self) -> anyhow::Result<Permission> {
            panic!("must not be called when unsupported");
        }
    }

    struct Failing;

    #[async_trait]
    impl PermissionProvider for Failing {
        fn is_supported(&self) -> bool {
            true
        }

        async fn current(&self) -> Permission {
            Permission::Default
        }

        async fn request(&self) -> anyhow::Result<Permission> {
            anyhow::bail!("prompt unavailable")
        }
    }

    #[tokio::test]
    async fn unsupported_provider_denies_without_prompting() {
        assert_eq!(request_permission(&Unsupported).await, Permission::Denied);
    }

    #[tokio::test]
    async fn failed_prompt_denies() {
        assert_eq!(request_permission(&Failing).await, Permission::Denied);
    }

    #[test]
    fn permission_display_matches_platform_strings() {
        assert_eq!(Permission::Granted.to_string(), "granted");
        assert_eq!(Permission::Denied.to_string(), "denied");
        assert_eq!(Permission::Default.to_string(), "default");
    }
}
