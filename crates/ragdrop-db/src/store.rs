//! [`VectorStore`] implementation over the SQLite database.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use ragdrop_core::{EmbeddedChunk, Result, ScoredChunk, StoreStats, VectorStore};
use std::path::Path;
use tracing::info;

/// One named collection inside a SQLite vector store file.
///
/// SQLite calls block, so every operation runs on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteVectorStore {
    db: Database,
    collection: String,
}

impl SqliteVectorStore {
    pub fn new(db: Database, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    /// Open (or create) the store file and bind it to a collection.
    pub fn open<P: AsRef<Path>>(path: P, collection: impl Into<String>) -> DbResult<Self> {
        Ok(Self::new(Database::open(path)?, collection))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn blocking<T, F>(&self, f: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Database, String) -> DbResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        let collection = self.collection.clone();
        tokio::task::spawn_blocking(move || f(db, collection))
            .await
            .map_err(|e| DbError::Other(format!("store task failed: {}", e)))?
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn upsert(&self, batch: Vec<EmbeddedChunk>) -> Result<()> {
        let written = self
            .blocking(move |db, collection| db.insert_embedded_chunks(&collection, &batch))
            .await?;
        info!("Upserted {} chunks into '{}'", written, self.collection);
        Ok(())
    }

    async fn query_similar(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let vector = vector.to_vec();
        let results = self
            .blocking(move |db, collection| db.vector_search(&collection, &vector, k))
            .await?;
        Ok(results)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let stats = self
            .blocking(|db, collection| db.collection_stats(&collection))
            .await?;
        Ok(stats)
    }
}
