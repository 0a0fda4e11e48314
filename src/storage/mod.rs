//! Key-value persistence for review items, policy and learning state.
//!
//! The engine only needs `load(key)` / `save(key, json)`. Two stores ship:
//!
//! - [`JsonFileStore`]: one pretty-printed JSON file per key under a data
//!   directory, written via temp file + rename under an advisory `fs2` lock
//! - [`MemoryStore`]: in-process map, used by tests and embedders that persist
//!   elsewhere
//!
//! Persistence is best-effort from the engine's point of view: see
//! [`load_or_default`] and [`save_best_effort`].

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::EditorialError;

/// Storage key for the review item collection.
pub const REVIEW_ITEMS_KEY: &str = "review-items";
/// Storage key for the active review policy.
pub const REVIEW_POLICY_KEY: &str = "review-policy";
/// Storage key for the adaptive learning state.
pub const LEARNING_STATE_KEY: &str = "learning-state";

/// Minimal key-value contract used by the repository and the learning loop.
pub trait KeyValueStore {
    /// Load the JSON value stored under `key`, or `None` when absent.
    fn load(&self, key: &str) -> Result<Option<Value>, EditorialError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &Value) -> Result<(), EditorialError>;
}

/// Load and deserialize `key`, falling back to `T::default()` on any failure.
///
/// A missing key is the normal first-run case and is logged at debug level;
/// unreadable or malformed data is logged as a warning and replaced by a fresh
/// value.
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.load(key) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is malformed, starting fresh");
                T::default()
            }
        },
        Ok(None) => {
            tracing::debug!(key, "no stored value, starting fresh");
            T::default()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load stored value, starting fresh");
            T::default()
        }
    }
}

/// Serialize and save `value` under `key`. Returns whether the write succeeded.
///
/// Failures are logged and swallowed: the in-memory copy stays authoritative.
pub fn save_best_effort<T, S>(store: &S, key: &str, value: &T) -> bool
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize value for storage");
            return false;
        }
    };
    match store.save(key, &json) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to persist value, keeping in-memory copy");
            false
        }
    }
}

/// Flat-file JSON store: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on the
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the JSON files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, EditorialError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn lock_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.lock", key))
    }
}

fn validate_key(key: &str) -> Result<(), EditorialError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(EditorialError::Storage {
            key: key.to_string(),
            message: "keys may only contain ASCII letters, digits, '-' and '_'".to_string(),
        })
    }
}

fn io_error(key: &str, action: &str, e: std::io::Error) -> EditorialError {
    EditorialError::Storage {
        key: key.to_string(),
        message: format!("{}: {}", action, e),
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, EditorialError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).map_err(|e| io_error(key, "failed to read file", e))?;
        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), EditorialError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| io_error(key, "failed to create data directory", e))?;

        let lock_file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path_for(key))
            .map_err(|e| io_error(key, "failed to open lock file", e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| io_error(key, "failed to acquire lock", e))?;

        let content = serde_json::to_string_pretty(value)?;
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));
        let result = fs::write(&tmp_path, content)
            .and_then(|_| fs::rename(&tmp_path, &path))
            .map_err(|e| io_error(key, "failed to write file", e));

        if let Err(e) = FileExt::unlock(&lock_file) {
            tracing::debug!(key, error = %e, "failed to release storage lock");
        }
        result?;

        tracing::debug!(key, path = %path.display(), "persisted value");
        Ok(())
    }
}

/// In-memory store. Optionally rejects every save to exercise the
/// persistence-failure path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `save` always fails.
    pub fn failing() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            fail_saves: true,
        }
    }

    /// Raw access to a stored value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// Seed a raw value, bypassing `fail_saves`.
    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, EditorialError> {
        let values = self.values.lock().map_err(|_| EditorialError::Storage {
            key: key.to_string(),
            message: "memory store lock poisoned".to_string(),
        })?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), EditorialError> {
        if self.fail_saves {
            return Err(EditorialError::Storage {
                key: key.to_string(),
                message: "saves are disabled for this store".to_string(),
            });
        }
        let mut values = self.values.lock().map_err(|_| EditorialError::Storage {
            key: key.to_string(),
            message: "memory store lock poisoned".to_string(),
        })?;
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}
