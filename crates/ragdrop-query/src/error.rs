//! Error types for the query engine.

use thiserror::Error;

/// Result type for query operations.
pub type EngineResult<T> = Result<T, QueryError>;

/// Errors that can occur while answering a question.
///
/// No partial answer is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Question is empty")]
    EmptyQuestion,

    /// Embedding the question or generating the answer failed.
    #[error("Model provider failed: {0}")]
    Provider(ragdrop_core::Error),

    #[error("Vector store query failed: {0}")]
    Store(ragdrop_core::Error),

    #[error("A query is already in progress")]
    Busy,

    #[error("Query cancelled")]
    Cancelled,
}

impl QueryError {
    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::EmptyQuestion => "empty_question",
            QueryError::Provider(_) => "provider",
            QueryError::Store(_) => "store",
            QueryError::Busy => "busy",
            QueryError::Cancelled => "cancelled",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QueryError::Provider(_) | QueryError::Store(_) | QueryError::Busy
        )
    }
}
