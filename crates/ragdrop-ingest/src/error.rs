//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Parse error for {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// The embedding provider failed; the file stays unprocessed.
    #[error("Embedding failed: {0}")]
    Provider(ragdrop_core::Error),

    /// The vector store rejected the batch; the file stays unprocessed.
    #[error("Vector store write failed: {0}")]
    Store(ragdrop_core::Error),

    #[error("Could not mark {path} as processed: {source}")]
    Mark {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Io(_) => "io",
            IngestError::FileNotFound(_) => "file_not_found",
            IngestError::ParseError { .. } => "parse",
            IngestError::Provider(_) => "provider",
            IngestError::Store(_) => "store",
            IngestError::Mark { .. } => "mark",
        }
    }

    /// Whether retrying on a later cycle may succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, IngestError::Provider(_) | IngestError::Store(_))
    }
}
