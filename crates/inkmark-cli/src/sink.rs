//! Writing exported files to disk.

use inkmark_core::export::ArtifactSink;
use inkmark_core::storage::BoxFuture;
use std::path::{Path, PathBuf};

/// Saves artifacts into a directory, or to one fixed path.
#[derive(Debug, Clone)]
pub enum FileSink {
    Directory(PathBuf),
    File(PathBuf),
}

impl FileSink {
    /// A path ending in `.pdf` is a file, anything else a directory.
    pub fn for_output(path: &Path) -> Self {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            Self::File(path.to_path_buf())
        } else {
            Self::Directory(path.to_path_buf())
        }
    }

    pub fn target(&self, file_name: &str) -> PathBuf {
        match self {
            Self::Directory(dir) => dir.join(file_name),
            Self::File(path) => path.clone(),
        }
    }
}

impl ArtifactSink for FileSink {
    fn save_as(&self, file_name: &str, bytes: &[u8]) -> BoxFuture<'_, std::io::Result<()>> {
        let target = self.target(file_name);
        let bytes = bytes.to_vec();
        Box::pin(async move {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, bytes)?;
            log::info!("Wrote {}", target.display());
            Ok(())
        })
    }
}
