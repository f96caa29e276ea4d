//! Error types for ragdrop.

use thiserror::Error;

/// Core error type returned by the provider and store contracts.
#[derive(Error, Debug)]
pub enum Error {
    /// The embedding or generation provider failed or was unreachable.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The vector store rejected or failed a request.
    #[error("Vector store error: {0}")]
    Store(String),
}

/// Result type alias using ragdrop's Error.
pub type Result<T> = std::result::Result<T, Error>;

