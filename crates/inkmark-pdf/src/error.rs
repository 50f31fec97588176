//! PDF errors.

use inkmark_core::annotations::PageNumber;
use thiserror::Error;

/// Errors reading or modifying a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),
    #[error("Page {0} does not exist")]
    MissingPage(PageNumber),
    #[error("Page {0} has no usable MediaBox")]
    InvalidMediaBox(PageNumber),
    #[error("PDF object error: {0}")]
    Object(#[from] lopdf::Error),
}

/// Result type for PDF operations.
pub type PdfResult<T> = Result<T, PdfError>;
