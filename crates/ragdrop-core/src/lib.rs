//! Ragdrop Core - Domain types and the contracts shared by the ingestion
//! service and the query engine.
//!
//! The embedding model, the chat model and the vector store are external
//! collaborators. They are described here as traits and handed to the
//! pipeline and the query engine as explicit dependency objects.

mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod provider;
mod signal;
mod types;
pub mod vector;

pub use error::{Error, Result};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryVectorStore;
pub use provider::{EmbeddingProvider, GenerationProvider, VectorStore};
pub use signal::{stop_channel, StopHandle, StopSignal};
pub use types::*;
