//! Key/value draft store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

use crate::config::DraftConfig;
use crate::observability::metrics;

const MAX_KEY_LEN: usize = 256;

/// Default cap on stored keys.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("invalid draft key '{0}'")]
    InvalidKey(String),

    #[error("draft store is full ({0} entries)")]
    Full(usize),

    #[error("failed to persist drafts: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize drafts: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Concurrent draft map, optionally mirrored to a JSON file.
#[derive(Clone)]
pub struct DraftStore {
    entries: Arc<DashMap<String, Value>>,
    path: Option<Arc<PathBuf>>,
    max_entries: usize,
    write_lock: Arc<Mutex<()>>,
}

impl DraftStore {
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            path: None,
            max_entries: DEFAULT_MAX_ENTRIES,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open a store backed by `path`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file is
    /// logged and also starts empty; it is overwritten on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = DashMap::new();

        match load_from_file(&path) {
            Ok(Some(loaded)) => {
                for (key, value) in loaded {
                    entries.insert(key, value);
                }
                tracing::info!(path = %path.display(), count = entries.len(), "Drafts loaded");
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No draft file, starting empty");
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load drafts, starting empty"
                );
            }
        }

        metrics::record_draft_count(entries.len());
        Self {
            entries: Arc::new(entries),
            path: Some(Arc::new(path)),
            max_entries: DEFAULT_MAX_ENTRIES,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn from_config(config: &DraftConfig) -> Self {
        let store = match &config.persistence_path {
            Some(path) => Self::open(path),
            None => Self::in_memory(),
        };
        store.with_max_entries(config.max_entries)
    }

    /// Cap the number of stored keys. Existing keys loaded from disk are kept.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store `value` under `key`. Overwrites always succeed; a new key is
    /// rejected once the store holds `max_entries` keys.
    pub fn set(&self, key: &str, value: Value) -> Result<(), DraftError> {
        validate_key(key)?;
        {
            let _guard = self.lock();
            if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
                return Err(DraftError::Full(self.max_entries));
            }
            self.entries.insert(key.to_string(), value);
        }
        metrics::record_draft_count(self.entries.len());
        self.save()
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&self, key: &str) -> Result<Option<Value>, DraftError> {
        let removed = self.entries.remove(key).map(|(_, value)| value);
        if removed.is_some() {
            metrics::record_draft_count(self.entries.len());
            self.save()?;
        }
        Ok(removed)
    }

    /// Sorted keys starting with `prefix`.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the current contents to the backing file, if any.
    ///
    /// Writes go to a sibling temp file that is renamed over the target.
    pub fn save(&self) -> Result<(), DraftError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let _guard = self.lock();

        let snapshot: BTreeMap<String, Value> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_from_file(path: &Path) -> Result<Option<BTreeMap<String, Value>>, DraftError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let parsed = serde_json::from_str(&contents)?;
    Ok(Some(parsed))
}

fn validate_key(key: &str) -> Result<(), DraftError> {
    if key.is_empty() || key.chars().count() > MAX_KEY_LEN || key.chars().any(char::is_control) {
        return Err(DraftError::InvalidKey(key.to_string()));
    }
    Ok(())
}
