//! Device-local key-value persistence.
//!
//! Everything the subsystem persists (settings, the reminder dedup
//! cache, the one-shot update-success flag) goes through the
//! [`KeyValueStore`] trait. Two backings are provided: a JSON
//! file-per-key store rooted at a directory, and an in-memory store.
//!
//! The device-local root resolves to `dirs::config_dir()/wallet/` by
//! default and can be overridden with the `WALLET_CONFIG_DIR`
//! environment variable. Session-scoped storage uses the same file
//! store pointed at a host-supplied per-session directory (one that
//! survives a controller-initiated relaunch but not a fresh launch).

use crate::error::{Result, WalletError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Minimal string key-value store contract.
///
/// Corrupt or unreadable values are reported as absent, never as
/// errors; only writes can fail.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write the value for `key`, creating the store root if needed.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Device-local config root (`dirs::config_dir()/wallet/`).
///
/// Override with the `WALLET_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WALLET_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("wallet"))
        .unwrap_or_else(|| PathBuf::from("/tmp/wallet-config"))
}

/// File-backed store: one pretty-printed JSON document per key,
/// stored as `<root>/<key>.json`.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the device-local store under [`config_dir`].
    pub fn device_local() -> Self {
        Self::new(config_dir())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            WalletError::Storage(format!(
                "cannot create store directory {}: {e}",
                self.root.display()
            ))
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| WalletError::Storage(format!("cannot write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WalletError::Storage(format!(
                "cannot remove {}: {e}",
                path.display()
            ))),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .values
            .lock()
            .map_err(|_| WalletError::Storage("memory store lock poisoned".to_owned()))?;
        map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self
            .values
            .lock()
            .map_err(|_| WalletError::Storage("memory store lock poisoned".to_owned()))?;
        map.remove(key);
        Ok(())
    }
}

/// Load and parse a JSON value from the store.
///
/// Absence and parse failure both yield `None`; a parse failure is
/// logged at debug level (corrupt persisted state is treated as
/// missing, never surfaced).
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("discarding unparsable stored value for {key}: {e}");
            None
        }
    }
}

/// Serialize a value as pretty JSON and write it to the store.
///
/// # Errors
///
/// Returns an error if serialization or the underlying write fails.
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| WalletError::Storage(format!("cannot serialize value for {key}: {e}")))?;
    store.set(key, &json)
}
