//! Two-tier item store.
//!
//! The ephemeral tier holds one map per conversation and is always written.
//! The durable tier holds one document per user and is best effort: when it
//! fails the turn carries on with the ephemeral tier alone, a warning is
//! logged and the degraded-operation counter goes up.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use yaad_core::error::{Result, YaadError};
use yaad_core::normalize::NameNormalizer;
use yaad_core::types::{ConversationId, ItemRecord, UserId};

use crate::durable::DurableBackend;

/// Items remembered within one conversation.
#[derive(Debug)]
struct EphemeralScope {
    items: HashMap<String, String>,
    last_touched: DateTime<Utc>,
}

impl EphemeralScope {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            items: HashMap::new(),
            last_touched: now,
        }
    }
}

/// Normalized item name to location, per conversation and per user.
pub struct ItemStore {
    normalizer: NameNormalizer,
    ephemeral: Mutex<HashMap<ConversationId, EphemeralScope>>,
    durable: Option<Arc<dyn DurableBackend>>,
    degraded: AtomicU64,
}

impl ItemStore {
    pub fn new(normalizer: NameNormalizer, durable: Option<Arc<dyn DurableBackend>>) -> Self {
        Self {
            normalizer,
            ephemeral: Mutex::new(HashMap::new()),
            durable,
            degraded: AtomicU64::new(0),
        }
    }

    /// Session-only store, no durable tier.
    pub fn ephemeral_only(normalizer: NameNormalizer) -> Self {
        Self::new(normalizer, None)
    }

    /// Durable backend name, or "none".
    pub fn backend_name(&self) -> &'static str {
        self.durable.as_ref().map(|d| d.name()).unwrap_or("none")
    }

    /// Number of durable operations that failed and fell back to the ephemeral tier.
    pub fn degraded_operations(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Conversations currently holding an ephemeral tier.
    pub fn active_conversations(&self) -> Result<usize> {
        Ok(self.scopes()?.len())
    }

    /// Remember where an item was put. Returns the record as stored.
    ///
    /// A later store for the same normalized name overwrites the location.
    pub async fn store(
        &self,
        scope: &ConversationId,
        user: &UserId,
        name: &str,
        location: &str,
    ) -> Result<ItemRecord> {
        let record = ItemRecord::new(
            self.normalizer.normalize(name),
            NameNormalizer::normalize_location(location),
        );

        self.with_scope(scope, |s| {
            s.items.insert(record.name.clone(), record.location.clone());
        })?;
        debug!(scope = %scope, item = %record.name, "Stored item in session");

        if let Some(durable) = &self.durable {
            // Read-modify-write without a lock: concurrent conversations of one
            // user race last-write-wins.
            let outcome = match durable.load(user).await {
                Ok(mut doc) => {
                    doc.items.insert(record.name.clone(), record.location.clone());
                    durable.save(user, &doc).await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                self.degrade("store", user, &e);
            }
        }

        Ok(record)
    }

    /// Where an item was put, if known.
    ///
    /// Checks the conversation first, then the user's durable document. A
    /// durable hit is copied into the conversation.
    pub async fn retrieve(
        &self,
        scope: &ConversationId,
        user: &UserId,
        name: &str,
    ) -> Result<Option<String>> {
        let key = self.normalizer.normalize(name);

        if let Some(location) = self.with_scope(scope, |s| s.items.get(&key).cloned())? {
            debug!(scope = %scope, item = %key, "Found item in session");
            return Ok(Some(location));
        }

        let Some(durable) = &self.durable else {
            return Ok(None);
        };

        match durable.load(user).await {
            Ok(doc) => match doc.items.get(&key) {
                Some(location) => {
                    self.with_scope(scope, |s| {
                        s.items.insert(key.clone(), location.clone());
                    })?;
                    debug!(scope = %scope, item = %key, "Found item in durable store");
                    Ok(Some(location.clone()))
                }
                None => Ok(None),
            },
            Err(e) => {
                self.degrade("retrieve", user, &e);
                Ok(None)
            }
        }
    }

    /// Everything remembered for this conversation and user, sorted by name.
    ///
    /// The conversation's entry wins when both tiers know an item.
    pub async fn list_all(&self, scope: &ConversationId, user: &UserId) -> Result<Vec<ItemRecord>> {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();

        if let Some(durable) = &self.durable {
            match durable.load(user).await {
                Ok(doc) => merged.extend(doc.items),
                Err(e) => self.degrade("list_all", user, &e),
            }
        }

        let session = self.with_scope(scope, |s| s.items.clone())?;
        merged.extend(session);

        Ok(merged
            .into_iter()
            .map(|(name, location)| ItemRecord { name, location })
            .collect())
    }

    /// Forget everything, in both tiers.
    pub async fn clear_all(&self, scope: &ConversationId, user: &UserId) -> Result<()> {
        self.with_scope(scope, |s| s.items.clear())?;

        if let Some(durable) = &self.durable {
            if let Err(e) = durable.clear(user).await {
                self.degrade("clear_all", user, &e);
            }
        }
        info!(scope = %scope, user = %user, "Cleared all items");
        Ok(())
    }

    /// Drop a conversation's ephemeral tier. Returns whether it existed.
    pub fn end_session(&self, scope: &ConversationId) -> Result<bool> {
        let removed = self.scopes()?.remove(scope).is_some();
        if removed {
            debug!(scope = %scope, "Session items discarded");
        }
        Ok(removed)
    }

    /// Drop ephemeral tiers untouched for longer than `timeout`. Returns how many.
    pub fn purge_idle(&self, timeout: Duration) -> Result<usize> {
        self.purge_idle_at(Utc::now(), timeout)
    }

    fn purge_idle_at(&self, now: DateTime<Utc>, timeout: Duration) -> Result<usize> {
        let mut scopes = self.scopes()?;
        let before = scopes.len();
        scopes.retain(|_, s| now.signed_duration_since(s.last_touched) <= timeout);
        let purged = before - scopes.len();
        if purged > 0 {
            info!(purged, "Purged idle conversations");
        }
        Ok(purged)
    }

    fn scopes(&self) -> Result<MutexGuard<'_, HashMap<ConversationId, EphemeralScope>>> {
        self.ephemeral
            .lock()
            .map_err(|e| YaadError::Storage(format!("Session store lock poisoned: {}", e)))
    }

    /// Run `f` on a conversation's scope, creating it and marking it touched.
    fn with_scope<F, T>(&self, scope: &ConversationId, f: F) -> Result<T>
    where
        F: FnOnce(&mut EphemeralScope) -> T,
    {
        let now = Utc::now();
        let mut scopes = self.scopes()?;
        let entry = scopes
            .entry(scope.clone())
            .or_insert_with(|| EphemeralScope::new(now));
        entry.last_touched = now;
        Ok(f(entry))
    }

    fn degrade(&self, operation: &str, user: &UserId, err: &YaadError) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
        warn!(
            operation,
            user = %user,
            error = %err,
            "Durable store failed, continuing with session items only"
        );
    }
}

impl std::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStore")
            .field("backend", &self.backend_name())
            .field("degraded", &self.degraded_operations())
            .finish()
    }
}
