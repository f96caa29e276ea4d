//! Chunk write and count operations.

use crate::database::Database;
use crate::error::DbResult;
use chrono::Utc;
use ragdrop_core::vector::vec_to_blob;
use ragdrop_core::{EmbeddedChunk, StoreStats};
use rusqlite::params;
use tracing::debug;

impl Database {
    /// Write a batch of embedded chunks in one transaction.
    ///
    /// An existing id is overwritten in place; the pipeline always generates
    /// fresh ids, so in practice every row is new.
    pub fn insert_embedded_chunks(
        &self,
        collection: &str,
        batch: &[EmbeddedChunk],
    ) -> DbResult<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        {
            let mut chunk_stmt = tx.prepare(
                r#"
                INSERT INTO chunks (id, collection, content, source, page, start_index, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    collection = excluded.collection,
                    content = excluded.content,
                    source = excluded.source,
                    page = excluded.page,
                    start_index = excluded.start_index
                "#,
            )?;
            let mut vector_stmt = tx.prepare(
                r#"
                INSERT INTO embeddings (chunk_id, vector, dimensions)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    vector = excluded.vector,
                    dimensions = excluded.dimensions
                "#,
            )?;

            for item in batch {
                let chunk = &item.chunk;
                chunk_stmt.execute(params![
                    chunk.id,
                    collection,
                    chunk.text,
                    chunk.metadata.source,
                    chunk.metadata.page as i64,
                    chunk.metadata.start_index as i64,
                    now,
                ])?;
                vector_stmt.execute(params![
                    chunk.id,
                    vec_to_blob(&item.vector),
                    item.vector.len() as i64,
                ])?;
            }
        }

        tx.commit()?;
        debug!("Stored {} chunks in collection {}", batch.len(), collection);
        Ok(batch.len())
    }

    /// Chunk and distinct source counts for a collection.
    pub fn collection_stats(&self, collection: &str) -> DbResult<StoreStats> {
        let conn = self.conn()?;
        let (chunks, sources): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT source) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            chunks: chunks.max(0) as usize,
            sources: sources.max(0) as usize,
        })
    }
}
