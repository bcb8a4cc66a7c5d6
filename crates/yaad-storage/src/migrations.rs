//! Database schema migrations.
//!
//! Applies the initial schema: the per-user item document table and the
//! schema_migrations bookkeeping table.

use rusqlite::Connection;
use tracing::info;

use yaad_core::error::YaadError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), YaadError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| YaadError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| YaadError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: user_documents");
    }

    Ok(())
}

/// Version 1: one JSON item document per user.
fn apply_v1(conn: &Connection) -> Result<(), YaadError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user_documents (
            user_id     TEXT PRIMARY KEY NOT NULL,
            document    TEXT NOT NULL DEFAULT '{\"items\":{}}',
            updated_at  INTEGER NOT NULL
        );

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'user_documents');
        ",
    )
    .map_err(|e| YaadError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_run_once() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        // Running again should be idempotent.
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_user_documents_primary_key() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO user_documents (user_id, updated_at) VALUES ('u1', 1)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO user_documents (user_id, updated_at) VALUES ('u1', 2)",
            [],
        );
        assert!(dup.is_err());

        let doc: String = conn
            .query_row(
                "SELECT document FROM user_documents WHERE user_id = 'u1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(doc, r#"{"items":{}}"#);
    }
}
