//! Ragdrop DB - File-backed vector store using SQLite.
//!
//! Chunks and their embeddings live in one database file. Similarity search
//! is a brute-force cosine scan over a collection, which is plenty for a
//! personal document folder.

mod chunks;
mod database;
mod error;
mod migrations;
mod store;
mod vectors;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use store::SqliteVectorStore;
