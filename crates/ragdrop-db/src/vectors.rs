//! Vector search operations.

use crate::database::Database;
use crate::error::DbResult;
use ragdrop_core::vector::{blob_to_vec, cosine_similarity};
use ragdrop_core::{ChunkMetadata, DocumentChunk, ScoredChunk};
use rusqlite::params;

impl Database {
    /// Find the `limit` chunks most similar to `query_vector`.
    ///
    /// This performs a brute-force search over every embedding in the
    /// collection.
    pub fn vector_search(
        &self,
        collection: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> DbResult<Vec<ScoredChunk>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.content, c.source, c.page, c.start_index, e.vector
            FROM embeddings e
            JOIN chunks c ON c.id = e.chunk_id
            WHERE c.collection = ?1
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let page: i64 = row.get(3)?;
            let start_index: i64 = row.get(4)?;
            let chunk = DocumentChunk {
                id: row.get(0)?,
                text: row.get(1)?,
                metadata: ChunkMetadata {
                    source: row.get(2)?,
                    page: page.max(0) as u32,
                    start_index: start_index.max(0) as usize,
                },
            };
            let vector_bytes: Vec<u8> = row.get(5)?;
            Ok((chunk, vector_bytes))
        })?;

        let mut results: Vec<ScoredChunk> = Vec::new();
        for row_result in rows {
            let (chunk, vector_bytes) = row_result?;
            let score = cosine_similarity(query_vector, &blob_to_vec(&vector_bytes));
            results.push(ScoredChunk { chunk, score });
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);

        Ok(results)
    }
}
