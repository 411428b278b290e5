//! Fixtures shared by the unit and property tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::cache::{CacheStore, Expiry, KeyLock};
use crate::error::{CacheError, SourceError};
use crate::feed::{CachedPost, FeedCache, FeedCacheSettings};
use crate::source::PostSource;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Post `n`, created `n` seconds after a fixed epoch; larger `n` is newer.
pub fn post(n: i64) -> CachedPost {
    CachedPost {
        id: format!("post-{}", n),
        content: format!("content {}", n),
        author_username: format!("user{}", n % 7),
        created_at: base_time() + chrono::Duration::seconds(n),
        likes_count: 0,
        replies_count: 0,
    }
}

pub fn feed_cache(
    store: Arc<dyn CacheStore>,
    source: Arc<dyn PostSource>,
    max_posts: usize,
) -> FeedCache {
    let settings = FeedCacheSettings {
        max_posts,
        ..FeedCacheSettings::default()
    };
    FeedCache::new(store, source, settings)
}

// == Scripted Source ==
/// Source of truth over a fixed post list that counts its queries and can be
/// switched into failure.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    /// Newest first
    posts: Mutex<Vec<CachedPost>>,
    failing: AtomicBool,
    recent_calls: AtomicUsize,
    offset_calls: AtomicUsize,
}

impl ScriptedSource {
    /// Source holding `post(1)..=post(n)`.
    pub fn with_posts(n: i64) -> Arc<Self> {
        let source = Self::default();
        *source.posts.lock().unwrap() = (1..=n).rev().map(post).collect();
        Arc::new(source)
    }

    pub fn push_post(&self, post: CachedPost) {
        self.posts.lock().unwrap().insert(0, post);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }

    pub fn offset_calls(&self) -> usize {
        self.offset_calls.load(Ordering::SeqCst)
    }

    fn slice(&self, offset: usize, limit: usize) -> Result<Vec<CachedPost>, SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("scripted outage".to_string()));
        }
        let posts = self.posts.lock().unwrap();
        Ok(posts.iter().skip(offset).take(limit).cloned().collect())
    }
}

#[async_trait]
impl PostSource for ScriptedSource {
    async fn list_recent_posts(&self, limit: usize) -> Result<Vec<CachedPost>, SourceError> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.slice(0, limit)
    }

    async fn list_posts(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CachedPost>, SourceError> {
        self.offset_calls.fetch_add(1, Ordering::SeqCst);
        self.slice(offset, limit)
    }
}

// == Broken Cache Stores ==
/// Cache store whose every call fails.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Store("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _expiry: Expiry) -> Result<(), CacheError> {
        Err(CacheError::Store("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Store("connection refused".to_string()))
    }

    async fn lock(&self, _key: &str) -> Result<KeyLock, CacheError> {
        Err(CacheError::Store("connection refused".to_string()))
    }
}

/// Cache store that sleeps before answering every data call with nothing.
/// Locking is immediate.
#[derive(Debug)]
pub struct StallingStore {
    delay: Duration,
}

impl StallingStore {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CacheStore for StallingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _expiry: Expiry) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn lock(&self, _key: &str) -> Result<KeyLock, CacheError> {
        Ok(KeyLock::new(()))
    }
}
