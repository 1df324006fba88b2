// src/store/persistence.rs

//! Key-value storage for the persisted JSON blobs.
//!
//! Each category of state lives under its own fixed key and is rewritten in
//! full after every accepted change to that category.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

pub const QUESTIONS_KEY: &str = "aptimaster_questions";
pub const SUBMISSIONS_KEY: &str = "aptimaster_submissions";
pub const CONFIG_KEY: &str = "aptimaster_config";

/// Key-value blob storage behind the platform store.
///
/// Calls are synchronous and made while the store's write lock is held, so
/// saves are serialized in mutation order. Blobs are a few KB; the file
/// adapter blocks the calling worker thread for the duration of the write.
pub trait StateStorage: Send + Sync {
    /// Returns the stored blob, or `None` if the key was never written.
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    fn save(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        // Write then rename so a crash mid-write never leaves a truncated blob.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and decodes the blob under `key`.
/// A blob that exists but does not decode is an error rather than a silent reset.
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn StateStorage,
    key: &str,
) -> Result<Option<T>, AppError> {
    let Some(raw) = storage.load(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw).map(Some).map_err(|e| {
        AppError::InternalServerError(format!("Stored data under '{key}' is unreadable: {e}"))
    })
}

pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn StateStorage,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    storage.save(key, &raw).map_err(|e| {
        tracing::error!(key, "Failed to persist state: {:?}", e);
        AppError::from(e)
    })
}
