//! PDF page loader.

use super::{DocumentLoader, Page};
use crate::error::{IngestError, IngestResult};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::debug;

/// Loader for PDF files, one [`Page`] per PDF page.
pub struct PdfLoader;

impl PdfLoader {
    /// Create a new PDF loader.
    pub fn new() -> Self {
        Self
    }

    /// Extract pages from an in-memory PDF.
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> IngestResult<Vec<Page>> {
        let parse_error = |message: String| IngestError::ParseError {
            path: path.to_path_buf(),
            message,
        };

        // The extractor panics on some malformed documents.
        let texts = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| parse_error("PDF extractor panicked".to_string()))?
        .map_err(|e| parse_error(format!("Failed to extract text from PDF: {}", e)))?;

        let pages: Vec<Page> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page::new(i as u32 + 1, text.into_bytes()))
            .collect();

        debug!("Extracted {} pages from {:?}", pages.len(), path);

        Ok(pages)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> IngestResult<Vec<Page>> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        debug!("Parsing PDF: {:?}", path);
        let bytes = std::fs::read(path)?;
        self.load_bytes(path, &bytes)
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}
