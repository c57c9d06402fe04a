//! Error types for the wallet reminder subsystem.

/// Top-level error type for the reminder and update subsystem.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Notification settings load/save error.
    #[error("settings error: {0}")]
    Settings(String),

    /// Device-local or session storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Update lifecycle error (worker query, activation, relaunch).
    #[error("update error: {0}")]
    Update(String),

    /// Notification delivery error.
    #[error("notify error: {0}")]
    Notify(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, WalletError>;
