/// Key-value persistence behind every store in the crate
/// Values are raw serialized payloads; a `set` fully replaces what was there
use crate::error::{AppError, Result};
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Minimal string key-value interface (the shape of browser local storage)
pub trait KvStore: Send + Sync {
    /// Read the raw payload at `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` at `key`, replacing prior content
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; returns whether something was removed
    fn remove(&self, key: &str) -> Result<bool>;
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }
}

/// In-memory store, lost on drop
#[derive(Clone, Default)]
pub struct MemoryKv {
    map: Arc<DashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.map.remove(key).is_some())
    }
}

/// On-disk store backed by sled embedded database
#[derive(Clone)]
pub struct SledKv {
    db: sled::Db,
}

impl SledKv {
    /// Open (or create) the store in the given data directory
    pub fn open(data_dir: &Path) -> Result<Self> {
        let db_path = data_dir.join("store.db");
        debug!("Opening kv store at {:?}", db_path);

        let db = sled::open(&db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open kv store: {}", e)))?;

        debug!("KV store initialized at {:?}", db_path);
        Ok(Self { db })
    }

    /// Number of stored keys
    pub fn count(&self) -> usize {
        self.db.len()
    }
}

impl KvStore for SledKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes()) {
            Ok(Some(value)) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| AppError::Storage(format!("Non UTF-8 value at {}: {}", key, e))),
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read {}: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", key, e)))?;

        self.db
            .flush()
            .map_err(|e| AppError::Storage(format!("Failed to flush kv store: {}", e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .db
            .remove(key.as_bytes())
            .map_err(|e| AppError::Storage(format!("Failed to remove {}: {}", key, e)))?;
        Ok(removed.is_some())
    }
}
