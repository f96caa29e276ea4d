//! Contracts for the external collaborators.

use crate::error::Result;
use crate::types::{ChatMessage, EmbeddedChunk, ScoredChunk, StoreStats};
use async_trait::async_trait;

/// Maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic for identical input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Maps an ordered list of chat messages to free text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Generate a single completion for the given messages.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Persists embedded chunks and answers k-nearest-neighbour queries.
///
/// From ragdrop's point of view the store is append-only: the pipeline
/// never updates or deletes what it has written.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection this handle reads and writes.
    fn collection(&self) -> &str;

    /// Insert a batch of chunks as one logical request.
    async fn upsert(&self, batch: Vec<EmbeddedChunk>) -> Result<()>;

    /// Return up to `k` chunks ordered by descending similarity.
    async fn query_similar(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Chunk and source counts for the collection.
    async fn stats(&self) -> Result<StoreStats>;
}
