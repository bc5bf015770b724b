use std::path::Path;

use mupdf::{Document, TextPageFlags};

use affinex_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// The document handle is dropped on every exit path, including when page
/// extraction fails partway through.
#[derive(Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut pages = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::Extract(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::Extract(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::Extract(e.to_string()))?;

            // Use block/line iteration to match PyMuPDF's get_text() behavior
            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages.push(page_text);
        }

        Ok(pages)
    }
}
