//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::feed::FallbackPolicy;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of posts held in the feed cache entry
    pub max_cached_posts: usize,
    /// Lifetime of the feed cache entry in seconds
    pub cache_ttl: u64,
    /// Page size used when a feed request omits `limit`
    pub feed_page_size: usize,
    /// Replies per page when a post request omits `limit`
    pub reply_page_size: usize,
    /// Largest page size a feed or post request may ask for
    pub max_page_size: usize,
    /// Timeout applied to every cache store call, in milliseconds
    pub cache_op_timeout_ms: u64,
    /// Longest wait for the feed key's write lock, in milliseconds
    pub cache_lock_timeout_ms: u64,
    /// When a feed page is served from the source of truth instead of the cache
    pub pagination_fallback: FallbackPolicy,
    /// HTTP server port
    pub server_port: u16,
    /// Interval in seconds between expired-entry sweeps of the cache store
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHED_POSTS` - Feed cache bound (default: 50)
    /// - `CACHE_TTL_SECONDS` - Feed cache TTL (default: 3600)
    /// - `FEED_PAGE_SIZE` - Default page size (default: 5)
    /// - `REPLY_PAGE_SIZE` - Default replies per page (default: 50)
    /// - `MAX_PAGE_SIZE` - Largest accepted page size (default: 50)
    /// - `CACHE_OP_TIMEOUT_MS` - Cache call timeout (default: 250)
    /// - `CACHE_LOCK_TIMEOUT_MS` - Feed key lock wait (default: 2000)
    /// - `PAGINATION_FALLBACK` - `window-start` or `window-end` (default: window-start)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_cached_posts: env_or("MAX_CACHED_POSTS", defaults.max_cached_posts),
            cache_ttl: env_or("CACHE_TTL_SECONDS", defaults.cache_ttl),
            feed_page_size: env_or("FEED_PAGE_SIZE", defaults.feed_page_size),
            reply_page_size: env_or("REPLY_PAGE_SIZE", defaults.reply_page_size),
            max_page_size: env_or("MAX_PAGE_SIZE", defaults.max_page_size),
            cache_op_timeout_ms: env_or("CACHE_OP_TIMEOUT_MS", defaults.cache_op_timeout_ms),
            cache_lock_timeout_ms: env_or("CACHE_LOCK_TIMEOUT_MS", defaults.cache_lock_timeout_ms),
            pagination_fallback: env_or("PAGINATION_FALLBACK", defaults.pagination_fallback),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }

    /// TTL of the feed entry as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Timeout applied to each cache store call.
    pub fn cache_op_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_op_timeout_ms)
    }

    /// Longest wait for the feed key's write lock.
    pub fn cache_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_lock_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cached_posts: 50,
            cache_ttl: 3600,
            feed_page_size: 5,
            reply_page_size: 50,
            max_page_size: 50,
            cache_op_timeout_ms: 250,
            cache_lock_timeout_ms: 2000,
            pagination_fallback: FallbackPolicy::WindowStart,
            server_port: 3000,
            cleanup_interval: 30,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
