//! SQLite file handle shared by the watch and query processes.

use crate::error::{DbError, DbResult};
use crate::migrations;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use tracing::info;

pub type ConnectionPool = Pool<SqliteConnectionManager>;
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

// WAL lets the query process read while the watch process writes.
const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA foreign_keys = ON;
     PRAGMA busy_timeout = 5000;";

/// Pooled connections to one vector store database.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open the store file, creating it and its parent directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::Other(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        info!("Opening vector store at: {}", path.display());
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch(FILE_PRAGMAS));
        Self::with_manager(manager, 4)
    }

    /// In-memory store for tests. A memory database is private to its
    /// connection, so the pool holds exactly one.
    pub fn open_in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        Self::with_manager(manager, 1)
    }

    fn with_manager(manager: SqliteConnectionManager, max_size: u32) -> DbResult<Self> {
        let pool = Pool::builder().max_size(max_size).build(manager)?;
        migrations::initialize_schema(&*pool.get()?)?;
        Ok(Self { pool })
    }

    pub fn conn(&self) -> DbResult<PooledConn> {
        self.pool.get().map_err(DbError::from)
    }

    /// Schema version recorded in the file.
    pub fn schema_version(&self) -> DbResult<i32> {
        migrations::schema_version(&*self.conn()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), migrations::SCHEMA_VERSION);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.schema_version().unwrap(), migrations::SCHEMA_VERSION);
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        drop(Database::open(&path).unwrap());
        let db = Database::open(&path).unwrap();
        assert_eq!(db.schema_version().unwrap(), migrations::SCHEMA_VERSION);
    }
}
