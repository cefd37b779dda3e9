//! Host key-value storage shared by every context.
//!
//! Reads always go to the backing store, so two contexts holding their own handle
//! see each other's writes; concurrent writers resolve as last-write-wins.
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use copytools_logging::copy_warn;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::persist::{read_if_exists, AtomicFileWriter, PersistError};

pub const HISTORY_KEY: &str = "copyHistory";
pub const SETTINGS_KEY: &str = "settings";
pub const LAST_UPDATED_KEY: &str = "lastUpdated";

pub const STORAGE_FILENAME: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Persist(#[from] PersistError),
    #[error("storage file {path:?} is not a JSON object: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to encode storage: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage rejected the write")]
    Rejected,
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Writes all entries together.
    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }
}

/// All keys live in one JSON object file inside the data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILENAME)
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let path = self.path();
        let Some(text) = read_if_exists(&path)? else {
            return Ok(Map::new());
        };
        parse_object(&path, &text)
    }
}

fn parse_object(path: &Path, text: &str) -> Result<Map<String, Value>, StorageError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StorageError::Corrupt {
            path: path.to_path_buf(),
            message: format!("found {other}"),
        }),
        Err(err) => Err(StorageError::Corrupt {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StorageError> {
        let mut map = match self.read_all() {
            Ok(map) => map,
            Err(StorageError::Corrupt { path, message }) => {
                copy_warn!("Replacing unreadable storage {:?}: {}", path, message);
                Map::new()
            }
            Err(err) => return Err(err),
        };
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        AtomicFileWriter::new(self.dir.clone()).write(STORAGE_FILENAME, &content)?;
        Ok(())
    }
}

/// Volatile store for tests and dry runs. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<Map<String, Value>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.entries.borrow().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Rejected);
        }
        let mut map = self.entries.borrow_mut();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
