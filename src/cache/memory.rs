//! In-Memory Cache Store
//!
//! HashMap-backed [`CacheStore`] with per-key TTL, used when no external cache
//! is configured and in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::cache::{CacheEntry, CacheStats, CacheStore, Expiry, KeyLock};
use crate::error::CacheError;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

// == Memory Store ==
/// Process-local cache store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    /// One mutex per locked key, shared by every handle on this store
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired keys, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - inner.entries.len();

        let remaining = inner.entries.len();
        inner.stats.record_expirations(removed);
        inner.stats.set_total_entries(remaining);
        removed
    }

    /// Returns the number of keys currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        // Write lock: expired keys are dropped on read and stats are updated
        let mut inner = self.inner.write().await;

        let expired = match inner.entries.get(key) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => {
                let value = entry.value.clone();
                inner.stats.record_hit();
                return Ok(Some(value));
            }
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.record_expirations(1);
        }
        inner.stats.record_miss();
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: Expiry) -> Result<(), CacheError> {
        let mut inner = self.inner.write().await;

        let entry = match expiry {
            Expiry::After(ttl) => CacheEntry::new(value, ttl),
            Expiry::Keep => match inner.entries.get(key) {
                Some(current) if !current.is_expired() => {
                    CacheEntry::with_deadline(value, current.expires_at)
                }
                _ => return Ok(()),
            },
        };

        inner.entries.insert(key.to_string(), entry);
        let total = inner.entries.len();
        inner.stats.set_total_entries(total);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.write().await;
        inner.entries.remove(key);
        let total = inner.entries.len();
        inner.stats.set_total_entries(total);
        Ok(())
    }

    async fn lock(&self, key: &str) -> Result<KeyLock, CacheError> {
        let mutex = {
            let mut locks = self.key_locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        Ok(KeyLock::new(mutex.lock_owned().await))
    }
}
