use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extract(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF page-text extraction backends.
///
/// Implementors provide the low-level per-page text step; joining pages and
/// all further cleanup happen in the extraction pipeline. The document
/// handle must be released on every exit path, including mid-extraction
/// failures.
pub trait PdfBackend: Send + Sync {
    /// Extract the plain text of every page, in physical page order.
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}
