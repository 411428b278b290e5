//! Cache Module
//!
//! The key/value blob store the feed cache is built on: the [`CacheStore`]
//! contract and an in-memory implementation with TTL expiration.

mod entry;
mod memory;
mod stats;
mod store;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use memory::MemoryStore;
pub use stats::CacheStats;
pub use store::{CacheStore, Expiry, KeyLock};
