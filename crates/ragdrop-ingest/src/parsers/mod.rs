//! Document loaders.

mod pdf;

pub use pdf::PdfLoader;

use crate::error::IngestResult;
use std::path::Path;

/// Raw text of one page of a document.
///
/// The bytes are whatever the extractor produced and may contain malformed
/// UTF-8; they are sanitized before chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub bytes: Vec<u8>,
}

impl Page {
    pub fn new(number: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            number,
            bytes: bytes.into(),
        }
    }

    /// True when the page has no visible text.
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|b| b.is_ascii_whitespace())
    }
}

/// Trait for document loaders.
///
/// Loading is blocking; the pipeline runs it off the async executor.
pub trait DocumentLoader: Send + Sync {
    /// Load every page of the file at the given path, in order.
    fn load(&self, path: &Path) -> IngestResult<Vec<Page>>;

    /// Get the supported file extensions.
    fn extensions(&self) -> &[&str];

    /// Check if this loader supports the given extension.
    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
