//! Snapshot persistence.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::snapshot::ExportSnapshot;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Key the editor saves under when none is given.
pub const DEFAULT_SNAPSHOT_KEY: &str = "pdfAnnotations";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Backend that keeps snapshots by key.
pub trait SnapshotStorage: Send + Sync {
    /// Save a snapshot, replacing any previous one under `key`.
    fn save(&self, key: &str, snapshot: &ExportSnapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a snapshot.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<ExportSnapshot>>;

    /// Remove a snapshot, returning whether one was stored under `key`.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Stored keys, sorted.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}
