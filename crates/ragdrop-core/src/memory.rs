//! In-memory vector store.
//!
//! Brute-force cosine search over a vector held behind an async lock. Useful
//! for tests and for running the pipeline without a database file.

use crate::error::Result;
use crate::provider::VectorStore;
use crate::types::{EmbeddedChunk, ScoredChunk, StoreStats};
use crate::vector::cosine_similarity;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

pub struct MemoryVectorStore {
    collection: String,
    entries: RwLock<Vec<EmbeddedChunk>>,
}

impl MemoryVectorStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of everything stored, in insertion order.
    pub async fn entries(&self) -> Vec<EmbeddedChunk> {
        self.entries.read().await.clone()
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new("documents")
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn upsert(&self, batch: Vec<EmbeddedChunk>) -> Result<()> {
        let mut entries = self.entries.write().await;
        for item in batch {
            match entries.iter_mut().find(|e| e.chunk.id == item.chunk.id) {
                Some(existing) => *existing = item,
                None => entries.push(item),
            }
        }
        Ok(())
    }

    async fn query_similar(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_similarity(vector, &e.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let entries = self.entries.read().await;
        let sources: HashSet<&str> = entries
            .iter()
            .map(|e| e.chunk.metadata.source.as_str())
            .collect();
        Ok(StoreStats {
            chunks: entries.len(),
            sources: sources.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkMetadata, DocumentChunk};

    fn embedded(text: &str, source: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: DocumentChunk::new(text, ChunkMetadata::new(source, 1, 0)),
            vector,
        }
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let store = MemoryVectorStore::default();
        store
            .upsert(vec![
                embedded("rust", "a.pdf", vec![1.0, 0.0]),
                embedded("python", "b.pdf", vec![0.0, 1.0]),
                embedded("mostly rust", "a.pdf", vec![0.8, 0.2]),
            ])
            .await
            .unwrap();

        let results = store.query_similar(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "rust");
        assert_eq!(results[1].chunk.text, "mostly rust");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_stats_counts_sources() {
        let store = MemoryVectorStore::default();
        store
            .upsert(vec![
                embedded("one", "a.pdf", vec![1.0]),
                embedded("two", "a.pdf", vec![1.0]),
                embedded("three", "b.pdf", vec![1.0]),
            ])
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.sources, 2);
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = MemoryVectorStore::default();
        let results = store.query_similar(&[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }
}
