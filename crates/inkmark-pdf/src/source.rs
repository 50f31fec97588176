//! Loaded PDF as a page source.

use crate::error::{PdfError, PdfResult};
use crate::pages;
use inkmark_core::annotations::PageNumber;
use inkmark_core::export::pipeline::{PageSource, SourceError, SourceLoader};
use inkmark_core::storage::BoxFuture;
use kurbo::Size;
use lopdf::Document;
use std::path::Path;

/// The original bytes of a PDF plus the geometry of its pages.
///
/// Export always starts over from `bytes`, so annotations are never baked in
/// twice.
#[derive(Debug, Clone)]
pub struct PdfSource {
    bytes: Vec<u8>,
    sizes: Vec<Size>,
}

impl PdfSource {
    /// Parse `bytes` and read each page's MediaBox.
    pub fn from_bytes(bytes: Vec<u8>) -> PdfResult<Self> {
        let doc = Document::load_mem(&bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
        let count = doc.get_pages().len() as PageNumber;
        let sizes = (1..=count)
            .map(|page| pages::page_size(&doc, page))
            .collect::<PdfResult<Vec<_>>>()?;
        log::info!("Loaded PDF with {} pages", count);
        Ok(Self { bytes, sizes })
    }

    pub fn open(path: impl AsRef<Path>) -> PdfResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> u32 {
        self.sizes.len() as u32
    }

    fn page_size(&self, page: PageNumber) -> Option<Size> {
        let index = (page as usize).checked_sub(1)?;
        self.sizes.get(index).copied()
    }
}

impl SourceLoader for PdfSource {
    fn load_source(&self) -> BoxFuture<'_, Result<Vec<u8>, SourceError>> {
        Box::pin(async move { Ok(self.bytes.clone()) })
    }
}
