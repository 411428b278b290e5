//! Cache Store Port
//!
//! The byte-oriented key/value contract the feed cache is written against.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Expiry to apply when writing a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Expire `Duration` from now
    After(Duration),
    /// Keep the key's current expiry (Redis `KEEPTTL`). Writing a missing key
    /// with `Keep` does nothing.
    Keep,
}

/// Exclusive hold on one key, released when dropped.
///
/// Every writer sharing the store must take it before a read-modify-write of
/// the key.
pub struct KeyLock {
    _guard: Box<dyn Send + Sync>,
}

impl KeyLock {
    /// Wraps whatever releases the lock on drop.
    pub fn new<G: Send + Sync + 'static>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for KeyLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyLock")
    }
}

/// Key/value blob store with TTL support.
///
/// Implementations may be remote; every call can fail or stall, and callers are
/// expected to bound each call with a timeout.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Returns the stored bytes, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`.
    async fn set(&self, key: &str, value: Vec<u8>, expiry: Expiry) -> Result<(), CacheError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Waits for exclusive ownership of `key` among all users of this store.
    ///
    /// Plain `get`/`set` calls do not take the lock; it only orders writers
    /// that take it.
    async fn lock(&self, key: &str) -> Result<KeyLock, CacheError>;
}
