mod config;
pub mod database;

pub use config::{ClockConfig, Config, NotificationsConfig, PomodoroDefaults, TickConfig};
pub use database::Database;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{ConfigError, StoreError};

/// Keys under which the engine persists its snapshots.
pub mod keys {
    pub const ALARMS: &str = "alarms";
    pub const SAVED_TIMERS: &str = "saved_timers";
    pub const POMODORO_SETTINGS: &str = "pomodoro_settings";
    pub const POMODORO_STATS: &str = "pomodoro_stats";
    pub const POMODORO_TIMER: &str = "pomodoro_timer";
    pub const STOPWATCH: &str = "stopwatch";
    pub const COUNTDOWN: &str = "countdown";
}

/// Persistent key-value collaborator. Values are opaque serialized blobs.
pub trait KeyValueStore: Send {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what the engine wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns `~/.config/horologe[-dev]/` based on HOROLOGE_ENV.
///
/// Set HOROLOGE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HOROLOGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("horologe-dev")
    } else {
        base_dir.join("horologe")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        assert!(store.load("k").unwrap().is_none());
        writer.save("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
