//! Feed Module
//!
//! The bounded, newest-first feed cache and the resolver that pages through
//! it, falling back to the source of truth.

mod cache;
mod entry;
mod outcome;
mod pagination;
mod post;
mod stats;


pub use cache::{FeedCache, FeedCacheSettings, FeedSnapshot, FEED_KEY};
pub use entry::FeedEntry;
pub use outcome::{CacheOutcome, SkipReason};
pub use pagination::{
    FallbackPolicy, FeedPage, PageOrigin, PageRequest, Pagination, PaginationResolver,
};
pub use post::{CachedPost, CountDelta};
pub use stats::{FeedStats, FeedStatsSnapshot};
