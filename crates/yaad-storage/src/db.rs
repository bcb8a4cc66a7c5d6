//! SQLite file behind the durable item tier.
//!
//! One connection holds every user's item document. The file lives under the
//! configured data directory and is migrated on open, so a fresh install and
//! an upgraded one look the same to `SqliteBackend`.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use yaad_core::error::YaadError;

use crate::migrations;

/// The user-document database, shared by the blocking tasks of `SqliteBackend`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the document database, creating its data directory if needed.
    pub fn new(path: &Path) -> Result<Self, YaadError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| YaadError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| YaadError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());
        Self::migrated(conn)
    }

    /// Throwaway migrated database for tests.
    pub fn in_memory() -> Result<Self, YaadError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| YaadError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::migrated(conn)
    }

    fn migrated(conn: Connection) -> Result<Self, YaadError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` against the connection. Callers on the async side reach this
    /// through `spawn_blocking`; the lock is held until `f` returns.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, YaadError>
    where
        F: FnOnce(&Connection) -> Result<T, YaadError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| YaadError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
