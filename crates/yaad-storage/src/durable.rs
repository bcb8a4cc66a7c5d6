//! Durable tier backends.
//!
//! Each user's remembered items live in one JSON document. Backends report
//! failures as `Err`; whether a failure degrades the turn is decided by the
//! Item Store, never here.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use yaad_core::config::{DurableBackendKind, DurableConfig};
use yaad_core::error::{Result, YaadError};
use yaad_core::types::UserId;

use crate::db::Database;

/// A user's durable item map, stored as `{"items": {name: location}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDocument {
    #[serde(default)]
    pub items: BTreeMap<String, String>,
}

/// Storage for per-user item documents.
#[async_trait]
pub trait DurableBackend: Send + Sync {
    /// Short name reported on the health endpoint.
    fn name(&self) -> &'static str;

    /// Load a user's document. A user with nothing stored gets an empty document.
    async fn load(&self, user: &UserId) -> Result<ItemDocument>;

    /// Replace a user's document.
    async fn save(&self, user: &UserId, document: &ItemDocument) -> Result<()>;

    /// Remove everything stored for a user.
    async fn clear(&self, user: &UserId) -> Result<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// Documents in the `user_documents` table. Queries run on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db: Arc<Database>,
}

impl SqliteBackend {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(Database::new(path)?)))
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| YaadError::Storage(format!("Blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl DurableBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn load(&self, user: &UserId) -> Result<ItemDocument> {
        let user_id = user.as_str().to_string();
        let raw: Option<String> = self
            .blocking(move |db| {
                db.with_conn(|conn| {
                    conn.query_row(
                        "SELECT document FROM user_documents WHERE user_id = ?1",
                        [&user_id],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| YaadError::Storage(format!("Failed to load document: {}", e)))
                })
            })
            .await?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ItemDocument::default()),
        }
    }

    async fn save(&self, user: &UserId, document: &ItemDocument) -> Result<()> {
        let user_id = user.as_str().to_string();
        let json = serde_json::to_string(document)?;
        let now = Utc::now().timestamp();
        self.blocking(move |db| {
            db.with_conn(|conn| {
                conn.execute(
                    "INSERT INTO user_documents (user_id, document, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(user_id) DO UPDATE SET
                        document = excluded.document,
                        updated_at = excluded.updated_at",
                    rusqlite::params![user_id, json, now],
                )
                .map_err(|e| YaadError::Storage(format!("Failed to save document: {}", e)))?;
                Ok(())
            })
        })
        .await
    }

    async fn clear(&self, user: &UserId) -> Result<()> {
        let user_id = user.as_str().to_string();
        self.blocking(move |db| {
            db.with_conn(|conn| {
                conn.execute("DELETE FROM user_documents WHERE user_id = ?1", [&user_id])
                    .map_err(|e| YaadError::Storage(format!("Failed to clear document: {}", e)))?;
                Ok(())
            })
        })
        .await
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-wide documents shared by every conversation; gone on restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<UserId, ItemDocument>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<UserId, ItemDocument>>> {
        self.documents
            .lock()
            .map_err(|e| YaadError::Storage(format!("Memory store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl DurableBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, user: &UserId) -> Result<ItemDocument> {
        Ok(self.lock()?.get(user).cloned().unwrap_or_default())
    }

    async fn save(&self, user: &UserId, document: &ItemDocument) -> Result<()> {
        self.lock()?.insert(user.clone(), document.clone());
        Ok(())
    }

    async fn clear(&self, user: &UserId) -> Result<()> {
        self.lock()?.remove(user);
        Ok(())
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Open the configured durable backend.
///
/// A backend that cannot be opened is logged and treated as absent: the
/// skill keeps working with session-only memory.
pub fn open_backend(config: &DurableConfig, data_dir: &Path) -> Option<Arc<dyn DurableBackend>> {
    match config.backend {
        DurableBackendKind::Sqlite => {
            let path = data_dir.join(&config.db_file);
            match SqliteBackend::open(&path) {
                Ok(backend) => {
                    info!(path = %path.display(), "Using SQLite durable store");
                    Some(Arc::new(backend))
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Durable store unavailable, items will last only for the conversation"
                    );
                    None
                }
            }
        }
        DurableBackendKind::Memory => {
            info!("Using in-memory durable store");
            Some(Arc::new(MemoryBackend::new()))
        }
        DurableBackendKind::None => {
            info!("No durable store configured, items will last only for the conversation");
            None
        }
    }
}
