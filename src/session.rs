//! Short-lived per-session key-value storage.
//!
//! Backs UI memory that should survive a restart within a working session
//! but not beyond it, such as the last active tab. Entries expire after a
//! configured lifetime and are dropped when the store is loaded.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value storage injected into the components that remember UI state.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store; forgets everything when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// One stored value with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionEntry {
    value: String,
    stored_at: DateTime<Utc>,
}

/// JSON-file store whose entries expire after `ttl`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, SessionEntry>,
}

impl FileSessionStore {
    /// Load the store from file.
    ///
    /// # Arguments
    /// * `path` - Path to the session JSON file
    /// * `ttl` - Lifetime of an entry
    ///
    /// # Returns
    /// * `Result<FileSessionStore>` - Loaded store or error
    ///
    /// # Details
    /// A missing file yields an empty store. Entries older than `ttl` are
    /// discarded.
    pub fn load(path: &Path, ttl: Duration) -> Result<Self> {
        let mut store = Self {
            path: path.to_path_buf(),
            ttl,
            entries: HashMap::new(),
        };

        if !path.exists() {
            return Ok(store);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;

        let entries: HashMap<String, SessionEntry> =
            serde_json::from_str(&content).with_context(|| "Failed to parse session file")?;

        let now = Utc::now();
        store.entries = entries
            .into_iter()
            .filter(|(_, entry)| now - entry.stored_at <= ttl)
            .collect();

        Ok(store)
    }

    /// Save the store to its file.
    ///
    /// # Details
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize session")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        (Utc::now() - entry.stored_at <= self.ttl).then(|| entry.value.clone())
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(
            key.to_string(),
            SessionEntry {
                value: value.to_string(),
                stored_at: Utc::now(),
            },
        );
    }
}

/// Remembers which tab was active last.
///
/// Written on every user tab switch, read once at start-up.
#[derive(Debug)]
pub struct TabMemory<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> TabMemory<S> {
    pub const KEY: &'static str = "activeRepairTab";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record the tab the user switched to.
    pub fn remember(&mut self, tab_id: &str) {
        self.store.set(Self::KEY, tab_id);
    }

    /// Identifier of the previously active tab, if any.
    pub fn restore(&self) -> Option<String> {
        self.store.get(Self::KEY).filter(|id| !id.is_empty())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemorySessionStore::default();
        assert!(store.get("k").is_none());
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_tab_memory_restores_last_tab() {
        let mut memory = TabMemory::new(MemorySessionStore::default());
        assert!(memory.restore().is_none());
        memory.remember("employees-tab");
        memory.remember("selection-tab");
        assert_eq!(memory.restore().as_deref(), Some("selection-tab"));
    }

    #[test]
    fn test_file_store_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session.json");

        let mut store = FileSessionStore::load(&path, Duration::minutes(30)).unwrap();
        store.set(TabMemory::<FileSessionStore>::KEY, "selection-tab");
        store.save().unwrap();
        assert!(path.exists());

        let loaded = FileSessionStore::load(&path, Duration::minutes(30)).unwrap();
        let memory = TabMemory::new(loaded);
        assert_eq!(memory.restore().as_deref(), Some("selection-tab"));
    }

    #[test]
    fn test_file_store_drops_expired_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let stale = Utc::now() - Duration::hours(2);
        let content = format!(
            r#"{{"activeRepairTab": {{"value": "selection-tab", "stored_at": "{}"}}}}"#,
            stale.to_rfc3339()
        );
        fs::write(&path, content).unwrap();

        let loaded = FileSessionStore::load(&path, Duration::minutes(30)).unwrap();
        assert!(loaded.get("activeRepairTab").is_none());
    }
}
