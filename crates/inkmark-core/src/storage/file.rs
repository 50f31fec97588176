//! Snapshots as JSON files in a directory.

use super::{BoxFuture, SnapshotStorage, StorageError, StorageResult};
use crate::snapshot::ExportSnapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Stores one `<key>.json` file per snapshot.
///
/// Keys are escaped reversibly (`%XX` for bytes outside `[A-Za-z0-9_-]`) so
/// `list` reports them as they were saved. Writes go to a temporary file that
/// is renamed into place, so a crash never leaves a half-written snapshot.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Use `base_path`, creating it if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| io_error("create", &base_path, e))?;
        Ok(Self { base_path })
    }

    /// `<data_local_dir>/inkmark/snapshots`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("inkmark").join("snapshots"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", encode_key(key), EXTENSION))
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// Inverse of [`encode_key`]; `None` for names this storage did not write.
fn decode_key(name: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut rest = name.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = std::str::from_utf8(tail.get(..2)?).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

impl SnapshotStorage for FileStorage {
    fn save(&self, key: &str, snapshot: &ExportSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(key);
        let json = snapshot.to_json().map_err(|e| StorageError::Serialization(e.to_string()));

        Box::pin(async move {
            let json = json?;
            let temp = path.with_extension("json.tmp");
            fs::write(&temp, json).map_err(|e| io_error("write", &temp, e))?;
            fs::rename(&temp, &path).map_err(|e| io_error("replace", &path, e))?;
            log::debug!("Saved snapshot to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<ExportSnapshot>> {
        let path = self.path_for(key);
        let key = key.to_string();

        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound(key)),
                Err(e) => return Err(io_error("read", &path, e)),
            };
            ExportSnapshot::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.path_for(key);

        Box::pin(async move {
            match fs::remove_file(&path) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(io_error("remove", &path, e)),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries = fs::read_dir(&self.base_path).map_err(|e| io_error("read", &self.base_path, e))?;
            let mut keys: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|e| e == EXTENSION))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).and_then(decode_key))
                .collect();
            keys.sort();
            Ok(keys)
        })
    }
}
