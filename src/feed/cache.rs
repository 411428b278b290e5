//! Feed Cache
//!
//! Owns the single feed entry in the cache store. Every operation is a
//! read-modify-write of the whole blob, so mutations (and warm-ups) take the
//! store's lock on the feed key first. The lock lives in the store, not here:
//! every `FeedCache` sharing the store, in this process or another, queues on
//! it. Without it two writers would read the same state and the later write
//! would silently discard the earlier one.
//!
//! The cache is advisory. Store failures and timeouts turn reads into misses
//! and writes into no-ops, reported through [`CacheOutcome`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheStore, Expiry, KeyLock};
use crate::config::Config;
use crate::error::{CacheError, SourceError};
use crate::feed::{
    CacheOutcome, CachedPost, CountDelta, FeedEntry, FeedStats, SkipReason,
};
use crate::source::PostSource;

/// Cache key holding the feed entry.
pub const FEED_KEY: &str = "feed";

// == Settings ==
#[derive(Debug, Clone)]
pub struct FeedCacheSettings {
    /// Key the entry is stored under
    pub key: String,
    /// Bound on the number of cached posts
    pub max_posts: usize,
    /// Lifetime of the entry, refreshed by warm-ups and pushes
    pub ttl: Duration,
    /// Timeout for each cache store call
    pub op_timeout: Duration,
    /// Longest wait for the key lock
    pub lock_timeout: Duration,
}

impl FeedCacheSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            key: FEED_KEY.to_string(),
            max_posts: config.max_cached_posts,
            ttl: config.cache_ttl(),
            op_timeout: config.cache_op_timeout(),
            lock_timeout: config.cache_lock_timeout(),
        }
    }
}

impl Default for FeedCacheSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Cached posts plus whether they are the whole feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub posts: Vec<CachedPost>,
    pub complete: bool,
}

// == Feed Cache ==
pub struct FeedCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn PostSource>,
    settings: FeedCacheSettings,
    stats: FeedStats,
}

impl FeedCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn PostSource>,
        settings: FeedCacheSettings,
    ) -> Self {
        Self {
            store,
            source,
            settings,
            stats: FeedStats::new(),
        }
    }

    pub fn settings(&self) -> &FeedCacheSettings {
        &self.settings
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    // == Warm ==
    /// Replaces the entry with the most recent posts from the source of truth.
    ///
    /// A source failure leaves the cached entry untouched and is returned so
    /// the caller can fall back to the source for its read. A cache store
    /// failure is reported as [`CacheOutcome::Unavailable`].
    pub async fn warm(&self) -> Result<CacheOutcome, SourceError> {
        let _guard = match self.lock_key("warm").await {
            Ok(guard) => guard,
            Err(err) => return Ok(self.unavailable(err)),
        };
        self.stats.record_warm();

        let posts = match self.source.list_recent_posts(self.settings.max_posts).await {
            Ok(posts) => posts,
            Err(err) => {
                self.stats.record_warm_failure();
                warn!(error = %err, "feed cache warm-up failed at source of truth");
                return Err(err);
            }
        };

        if posts.is_empty() {
            debug!("source of truth has no posts, nothing to warm");
            return Ok(CacheOutcome::Skipped(SkipReason::EmptySnapshot));
        }

        let entry = FeedEntry::from_snapshot(posts, self.settings.max_posts);
        let outcome = self
            .write_entry("warm", &entry, Expiry::After(self.settings.ttl))
            .await;
        if outcome.is_applied() {
            info!(posts = entry.len(), complete = entry.is_complete(), "feed cache warmed");
        }
        Ok(outcome)
    }

    // == Get ==
    /// Cached posts newest first; empty when absent, expired or unreadable.
    pub async fn get(&self) -> Vec<CachedPost> {
        self.snapshot().await.posts
    }

    /// Like [`FeedCache::get`], also reporting whether the entry is the whole feed.
    pub async fn snapshot(&self) -> FeedSnapshot {
        match self.read_entry("get").await {
            Ok(Some(entry)) => {
                self.stats.record_hit();
                FeedSnapshot {
                    complete: entry.is_complete(),
                    posts: entry.into_posts(),
                }
            }
            Ok(None) => {
                self.stats.record_miss();
                FeedSnapshot::default()
            }
            Err(err) => {
                self.stats.record_miss();
                self.stats.record_cache_error();
                warn!(error = %err, "feed cache read failed, treating as miss");
                FeedSnapshot::default()
            }
        }
    }

    // == Push ==
    /// Adds a newly created post at the head and evicts from the tail past
    /// the bound. Refreshes the TTL.
    ///
    /// Does nothing when no entry is cached: the next read warms a full entry
    /// that already contains the post.
    pub async fn push(&self, post: CachedPost) -> CacheOutcome {
        let max_posts = self.settings.max_posts;
        let expiry = Expiry::After(self.settings.ttl);

        self.mutate("push", expiry, |entry| {
            let evicted = entry.push(post, max_posts);
            if evicted > 0 {
                self.stats.record_evictions(evicted);
            }
            true
        })
        .await
    }

    // == Remove ==
    /// Drops the post with `post_id`, keeping the entry's expiry.
    pub async fn remove(&self, post_id: &str) -> CacheOutcome {
        self.mutate("remove", Expiry::Keep, |entry| entry.remove(post_id))
            .await
    }

    // == Apply Delta ==
    /// Updates the counters of a cached post, keeping the entry's expiry.
    pub async fn apply_delta(&self, post_id: &str, delta: CountDelta) -> CacheOutcome {
        self.mutate("apply_delta", Expiry::Keep, |entry| {
            entry.apply_delta(post_id, delta)
        })
        .await
    }

    // == Internals ==
    async fn mutate<F>(&self, op: &'static str, expiry: Expiry, apply: F) -> CacheOutcome
    where
        F: FnOnce(&mut FeedEntry) -> bool,
    {
        let _guard = match self.lock_key(op).await {
            Ok(guard) => guard,
            Err(err) => return self.unavailable(err),
        };

        let mut entry = match self.read_entry(op).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return CacheOutcome::Skipped(SkipReason::EntryAbsent),
            Err(err) => return self.unavailable(err),
        };

        if !apply(&mut entry) {
            return CacheOutcome::Skipped(SkipReason::NotCached);
        }

        self.write_entry(op, &entry, expiry).await
    }

    /// Takes the store's lock on the feed key, waiting at most `lock_timeout`.
    async fn lock_key(&self, op: &'static str) -> Result<KeyLock, CacheError> {
        tokio::time::timeout(self.settings.lock_timeout, self.store.lock(&self.settings.key))
            .await
            .map_err(|_| CacheError::Timeout(op))?
    }

    async fn read_entry(&self, op: &'static str) -> Result<Option<FeedEntry>, CacheError> {
        let bytes = self.bounded(op, self.store.get(&self.settings.key)).await?;
        bytes.map(|b| FeedEntry::from_bytes(&b)).transpose()
    }

    async fn write_entry(
        &self,
        op: &'static str,
        entry: &FeedEntry,
        expiry: Expiry,
    ) -> CacheOutcome {
        let bytes = match entry.to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => return self.unavailable(err),
        };

        match self
            .bounded(op, self.store.set(&self.settings.key, bytes, expiry))
            .await
        {
            Ok(()) => CacheOutcome::Applied,
            Err(err) => self.unavailable(err),
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.settings.op_timeout, call)
            .await
            .map_err(|_| CacheError::Timeout(op))?
    }

    fn unavailable(&self, err: CacheError) -> CacheOutcome {
        self.stats.record_cache_error();
        CacheOutcome::Unavailable(err)
    }
}
