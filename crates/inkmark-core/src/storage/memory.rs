//! In-memory storage implementation.

use super::{BoxFuture, SnapshotStorage, StorageError, StorageResult};
use crate::snapshot::ExportSnapshot;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Key/value store holding serialized snapshots in memory.
///
/// Entries are kept as JSON text, so a load goes through the same parsing as
/// one from disk.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key`, bypassing serialization.
    pub fn insert_raw(&self, key: impl Into<String>, json: impl Into<String>) -> StorageResult<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.into(), json.into());
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Other("memory storage lock poisoned".to_string())
}

impl SnapshotStorage for MemoryStorage {
    fn save(&self, key: &str, snapshot: &ExportSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let result = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| self.insert_raw(key, json));
        Box::pin(async move { result })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<ExportSnapshot>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(poisoned)?;
            let json = entries.get(&key).ok_or_else(|| StorageError::NotFound(key.clone()))?;
            ExportSnapshot::from_json(json)
                .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.entries.write().map_err(poisoned)?.remove(&key).is_some()) })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.entries.read().map_err(poisoned)?.keys().cloned().collect()) })
    }
}
