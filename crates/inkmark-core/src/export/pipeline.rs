//! Collaborators of the export pipeline.
//!
//! Loading the source document, writing instructions into it and handing
//! the result to the user are all behind traits so the editor stays
//! independent of any particular document format.

use super::PageInstructions;
use crate::annotations::PageNumber;
use crate::storage::BoxFuture;
use kurbo::Size;
use std::path::Path;
use thiserror::Error;

/// Failure fetching the source document bytes.
#[derive(Debug, Error)]
#[error("Failed to load source document: {0}")]
pub struct SourceError(pub String);

/// Document writer errors.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Failed to open document: {0}")]
    Open(String),
    #[error("Page {0} does not exist")]
    MissingPage(PageNumber),
    #[error("Failed to embed font: {0}")]
    Font(String),
    #[error("Failed to write page {page}: {message}")]
    Page { page: PageNumber, message: String },
    #[error("Failed to save document: {0}")]
    Save(String),
}

/// Result type for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,
    #[error("No document is loaded")]
    NoDocument,
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error("Failed to hand over the exported file: {0}")]
    Sink(#[source] std::io::Error),
}

/// Page geometry of a loaded document, as reported by the renderer.
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Native size of `page` in document units.
    fn page_size(&self, page: PageNumber) -> Option<Size>;
}

/// Fetches the bytes of the document being annotated.
pub trait SourceLoader {
    fn load_source(&self) -> BoxFuture<'_, Result<Vec<u8>, SourceError>>;
}

/// Opens source bytes for writing.
pub trait DocumentWriter {
    fn open(&self, bytes: Vec<u8>) -> BoxFuture<'_, WriterResult<Box<dyn WritableDocument>>>;
}

/// A document opened by a [`DocumentWriter`].
pub trait WritableDocument {
    fn page_count(&self) -> u32;

    /// Height of `page` in document units.
    fn page_height(&self, page: PageNumber) -> Option<f64>;

    /// Register the text font. Called at most once per export, before any
    /// instruction that draws text.
    fn embed_font(&mut self) -> WriterResult<()>;

    /// Append the instructions to their page.
    fn apply(&mut self, page: &PageInstructions) -> WriterResult<()>;

    /// Serialize the modified document.
    fn save(&mut self) -> BoxFuture<'_, WriterResult<Vec<u8>>>;
}

/// Receives the finished artifact ("save as").
pub trait ArtifactSink {
    fn save_as(&self, file_name: &str, bytes: &[u8]) -> BoxFuture<'_, std::io::Result<()>>;
}

/// The annotated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `report.pdf` becomes `report_annotated.pdf`; names without an extension
/// get the suffix appended.
pub fn annotated_file_name(name: &str) -> String {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{}_annotated.{}", stem, ext),
        _ => format!("{}_annotated", name),
    }
}
