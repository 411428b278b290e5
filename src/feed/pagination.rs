//! Pagination Resolver
//!
//! Serves feed pages from the cache when it can and from the source of truth
//! when it cannot. Both paths fetch one element past the page to learn whether
//! another page exists; that element is never returned.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};
use crate::feed::{CachedPost, FeedCache, FeedSnapshot};
use crate::source::PostSource;

// == Fallback Policy ==
/// Decides when a page cannot be answered from the cached entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fall back only when the page starts past the cached tail; a page that
    /// straddles the tail of a complete entry is served partially from cache.
    #[default]
    WindowStart,
    /// Fall back whenever the page ends past the cached tail.
    WindowEnd,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window-start" | "window_start" => Ok(FallbackPolicy::WindowStart),
            "window-end" | "window_end" => Ok(FallbackPolicy::WindowEnd),
            other => Err(format!("unknown pagination fallback policy: {}", other)),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::WindowStart => f.write_str("window-start"),
            FallbackPolicy::WindowEnd => f.write_str("window-end"),
        }
    }
}

// == Page Request ==
/// A 1-based page of `limit` posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Result<Self> {
        if page == 0 {
            return Err(FeedError::InvalidRequest("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(FeedError::InvalidRequest("limit must be at least 1".to_string()));
        }
        Ok(Self { page, limit })
    }

    /// Index of the first post on the page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Index one past the last post on the page.
    pub fn end(&self) -> usize {
        self.offset().saturating_add(self.limit)
    }
}

// == Page Response ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub limit: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_posts_on_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrigin {
    Cache,
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<CachedPost>,
    pub pagination: Pagination,
    /// Where the page was served from
    pub served_from: PageOrigin,
}

impl FeedPage {
    /// Builds a page from up to `limit + 1` posts starting at the page offset.
    fn from_window(
        mut window: Vec<CachedPost>,
        request: PageRequest,
        origin: PageOrigin,
    ) -> Self {
        let has_next_page = window.len() > request.limit;
        window.truncate(request.limit);

        Self {
            pagination: Pagination {
                current_page: request.page,
                limit: request.limit,
                has_next_page,
                has_previous_page: request.page > 1,
                total_posts_on_page: window.len(),
            },
            posts: window,
            served_from: origin,
        }
    }
}

// == Pagination Resolver ==
pub struct PaginationResolver {
    cache: Arc<FeedCache>,
    source: Arc<dyn PostSource>,
    policy: FallbackPolicy,
}

impl PaginationResolver {
    pub fn new(
        cache: Arc<FeedCache>,
        source: Arc<dyn PostSource>,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            cache,
            source,
            policy,
        }
    }

    /// Returns the requested page, warming an empty cache at most once.
    ///
    /// Fails only when the page had to come from the source of truth and the
    /// source could not answer.
    pub async fn get_page(&self, request: PageRequest) -> Result<FeedPage> {
        let mut snapshot = self.cache.snapshot().await;

        if snapshot.posts.is_empty() {
            info!("feed cache miss, warming up cache");
            if let Err(err) = self.cache.warm().await {
                warn!(error = %err, "warm-up failed, reading from source of truth");
            }
            snapshot = self.cache.snapshot().await;
        }

        if self.needs_source(&snapshot, request) {
            debug!(
                page = request.page,
                limit = request.limit,
                cached = snapshot.posts.len(),
                "page not answerable from cache, fetching from source of truth"
            );
            return self.page_from_source(request).await;
        }

        let window: Vec<CachedPost> = snapshot
            .posts
            .into_iter()
            .skip(request.offset())
            .take(request.limit.saturating_add(1))
            .collect();
        Ok(FeedPage::from_window(window, request, PageOrigin::Cache))
    }

    fn needs_source(&self, snapshot: &FeedSnapshot, request: PageRequest) -> bool {
        let cached = snapshot.posts.len();
        if cached == 0 {
            return true;
        }

        // Past the tail of a truncated entry the cache cannot tell whether more
        // posts exist, so such pages always come from the source.
        let reaches_tail = request.end() >= cached;
        if reaches_tail && !snapshot.complete {
            return true;
        }

        match self.policy {
            FallbackPolicy::WindowStart => request.offset() >= cached,
            FallbackPolicy::WindowEnd => request.end() > cached,
        }
    }

    async fn page_from_source(&self, request: PageRequest) -> Result<FeedPage> {
        self.cache.stats().record_fallback();
        let window = self
            .source
            .list_posts(request.offset(), request.limit.saturating_add(1))
            .await?;
        Ok(FeedPage::from_window(window, request, PageOrigin::Source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::cache::{CacheStore, MemoryStore};
    use crate::feed::FeedCacheSettings;
    use crate::test_support::{feed_cache, post, FailingStore, ScriptedSource};

    fn resolver_over(
        store: Arc<dyn CacheStore>,
        source: Arc<ScriptedSource>,
        max_posts: usize,
        policy: FallbackPolicy,
    ) -> PaginationResolver {
        let cache = Arc::new(feed_cache(store, source.clone(), max_posts));
        PaginationResolver::new(cache, source, policy)
    }

    fn page(page: usize, limit: usize) -> PageRequest {
        PageRequest::new(page, limit).unwrap()
    }

    #[test]
    fn test_page_request_validation() {
        assert!(matches!(PageRequest::new(0, 5), Err(FeedError::InvalidRequest(_))));
        assert!(matches!(PageRequest::new(1, 0), Err(FeedError::InvalidRequest(_))));
        assert_eq!(page(3, 5).offset(), 10);
        assert_eq!(page(3, 5).end(), 15);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("window-start".parse(), Ok(FallbackPolicy::WindowStart));
        assert_eq!("WINDOW_END".parse(), Ok(FallbackPolicy::WindowEnd));
        assert!("sideways".parse::<FallbackPolicy>().is_err());
        assert_eq!(FallbackPolicy::WindowEnd.to_string(), "window-end");
    }

    #[tokio::test]
    async fn test_twelve_post_cache_pages() {
        let source = ScriptedSource::with_posts(12);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source.clone(),
            50,
            FallbackPolicy::WindowStart,
        );

        let first = resolver.get_page(page(1, 5)).await.unwrap();
        assert_eq!(first.posts.len(), 5);
        assert_eq!(first.posts[0].id, "post-12");
        assert!(first.pagination.has_next_page);
        assert!(!first.pagination.has_previous_page);
        assert_eq!(first.served_from, PageOrigin::Cache);

        let third = resolver.get_page(page(3, 5)).await.unwrap();
        assert_eq!(third.posts.len(), 2);
        assert_eq!(third.pagination.total_posts_on_page, 2);
        assert!(!third.pagination.has_next_page);
        assert!(third.pagination.has_previous_page);
        assert_eq!(third.served_from, PageOrigin::Cache);

        let fourth = resolver.get_page(page(4, 5)).await.unwrap();
        assert!(fourth.posts.is_empty());
        assert!(!fourth.pagination.has_next_page);
        assert_eq!(fourth.served_from, PageOrigin::Source);
        assert_eq!(source.offset_calls(), 1);
    }

    #[tokio::test]
    async fn test_exact_page_boundary_has_no_next() {
        let source = ScriptedSource::with_posts(10);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source,
            50,
            FallbackPolicy::WindowStart,
        );

        let second = resolver.get_page(page(2, 5)).await.unwrap();
        assert_eq!(second.posts.len(), 5);
        assert!(!second.pagination.has_next_page);
        assert_eq!(second.served_from, PageOrigin::Cache);
    }

    #[tokio::test]
    async fn test_cold_cache_warms_exactly_once() {
        let source = ScriptedSource::with_posts(30);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source.clone(),
            50,
            FallbackPolicy::WindowStart,
        );

        let result = resolver.get_page(page(1, 10)).await.unwrap();

        assert_eq!(result.posts.len(), 10);
        assert_eq!(result.served_from, PageOrigin::Cache);
        assert_eq!(source.recent_calls(), 1);
        assert_eq!(source.offset_calls(), 0);

        resolver.get_page(page(2, 10)).await.unwrap();
        assert_eq!(source.recent_calls(), 1, "warm cache is reused");
    }

    #[tokio::test]
    async fn test_expired_cache_warms_again() {
        let source = ScriptedSource::with_posts(8);
        let settings = FeedCacheSettings {
            ttl: Duration::from_millis(60),
            ..FeedCacheSettings::default()
        };
        let cache = Arc::new(FeedCache::new(
            Arc::new(MemoryStore::new()),
            source.clone(),
            settings,
        ));
        let resolver = PaginationResolver::new(cache, source.clone(), FallbackPolicy::WindowStart);

        resolver.get_page(page(1, 5)).await.unwrap();
        resolver.get_page(page(1, 5)).await.unwrap();
        assert_eq!(source.recent_calls(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let after_expiry = resolver.get_page(page(1, 5)).await.unwrap();
        assert_eq!(source.recent_calls(), 2);
        assert_eq!(after_expiry.served_from, PageOrigin::Cache);
        assert_eq!(after_expiry.posts[0].id, "post-8");
    }

    #[tokio::test]
    async fn test_empty_everything_returns_empty_page() {
        let source = ScriptedSource::with_posts(0);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source.clone(),
            50,
            FallbackPolicy::WindowStart,
        );

        let result = resolver.get_page(page(1, 5)).await.unwrap();

        assert!(result.posts.is_empty());
        assert!(!result.pagination.has_next_page);
        assert!(!result.pagination.has_previous_page);
        assert_eq!(source.recent_calls(), 1);
    }

    #[tokio::test]
    async fn test_far_page_is_empty() {
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            ScriptedSource::with_posts(12),
            50,
            FallbackPolicy::WindowStart,
        );

        let result = resolver.get_page(page(1000, 5)).await.unwrap();
        assert!(result.posts.is_empty());
        assert!(!result.pagination.has_next_page);
        assert!(result.pagination.has_previous_page);
    }

    #[tokio::test]
    async fn test_truncated_cache_tail_falls_back() {
        // Source holds 12 posts, cache holds the newest 10
        let source = ScriptedSource::with_posts(12);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source.clone(),
            10,
            FallbackPolicy::WindowStart,
        );

        let second = resolver.get_page(page(2, 5)).await.unwrap();
        assert_eq!(second.served_from, PageOrigin::Source);
        assert_eq!(second.posts.len(), 5);
        assert!(second.pagination.has_next_page, "two older posts exist beyond the cache");

        let third = resolver.get_page(page(3, 5)).await.unwrap();
        assert_eq!(third.posts.len(), 2);
        assert_eq!(third.posts[1].id, "post-1");
        assert!(!third.pagination.has_next_page);
    }

    #[tokio::test]
    async fn test_window_end_policy_falls_back_for_partial_page() {
        let source = ScriptedSource::with_posts(12);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source.clone(),
            50,
            FallbackPolicy::WindowEnd,
        );

        let third = resolver.get_page(page(3, 5)).await.unwrap();
        assert_eq!(third.served_from, PageOrigin::Source);
        assert_eq!(third.posts.len(), 2);
        assert!(!third.pagination.has_next_page);
    }

    #[tokio::test]
    async fn test_unavailable_cache_serves_from_source() {
        let source = ScriptedSource::with_posts(7);
        let resolver = resolver_over(
            Arc::new(FailingStore),
            source.clone(),
            50,
            FallbackPolicy::WindowStart,
        );

        let result = resolver.get_page(page(1, 5)).await.unwrap();

        assert_eq!(result.served_from, PageOrigin::Source);
        assert_eq!(result.posts.len(), 5);
        assert!(result.pagination.has_next_page);
    }

    #[tokio::test]
    async fn test_cache_and_source_down_is_an_error() {
        let source = ScriptedSource::with_posts(7);
        source.set_failing(true);
        let resolver =
            resolver_over(Arc::new(FailingStore), source, 50, FallbackPolicy::WindowStart);

        let result = resolver.get_page(page(1, 5)).await;
        assert!(matches!(result, Err(FeedError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_warm_cache_survives_source_outage() {
        let source = ScriptedSource::with_posts(7);
        let resolver = resolver_over(
            Arc::new(MemoryStore::new()),
            source.clone(),
            50,
            FallbackPolicy::WindowStart,
        );
        resolver.get_page(page(1, 5)).await.unwrap();

        source.set_failing(true);
        let second = resolver.get_page(page(2, 5)).await.unwrap();
        assert_eq!(second.posts.len(), 2);
        assert_eq!(second.served_from, PageOrigin::Cache);
    }

    #[tokio::test]
    async fn test_pushed_post_shows_on_first_page() {
        let source = ScriptedSource::with_posts(3);
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(feed_cache(store, source.clone(), 50));
        let resolver =
            PaginationResolver::new(cache.clone(), source, FallbackPolicy::WindowStart);
        resolver.get_page(page(1, 5)).await.unwrap();

        cache.push(post(4)).await;

        let first = resolver.get_page(page(1, 5)).await.unwrap();
        assert_eq!(first.posts[0].id, "post-4");
        assert_eq!(first.posts.len(), 4);
    }
}
