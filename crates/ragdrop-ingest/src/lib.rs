//! Ragdrop Ingest - Turns PDFs dropped into a folder into stored embeddings.
//!
//! This crate provides:
//! - Recursive character chunking with overlap
//! - Lossy UTF-8 sanitization of extracted text
//! - Per-page PDF text extraction
//! - The ingestion pipeline (load, chunk, embed, upsert)
//! - A polling folder watcher that marks ingested files by renaming them

mod chunker;
mod error;
mod ingestor;
mod parsers;
mod sanitize;
mod watcher;

pub use chunker::{ChunkConfig, Chunker};
pub use error::{IngestError, IngestResult};
pub use ingestor::{IngestOutcome, IngestProgress, Ingestor};
pub use parsers::{DocumentLoader, Page, PdfLoader};
pub use sanitize::sanitize;
pub use watcher::{
    mark_processed, CycleReport, FileOutcome, FileStatus, FolderWatcher, WatchState,
    WatcherConfig,
};

#[cfg(test)]
pub(crate) mod testing;
