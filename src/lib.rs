//! Feed Cache - a read-through cache for a social feed
//!
//! Keeps the newest posts of a feed in a single bounded, TTL-scoped cache
//! entry, corrects it in place after writes, and serves pages from it with a
//! fallback to the source of truth for anything the cache cannot answer.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod service;
pub mod source;
pub mod tasks;

#[cfg(test)]
mod test_support;

pub use api::AppState;
pub use config::Config;
pub use feed::{FeedCache, PaginationResolver};
pub use service::FeedService;
pub use tasks::spawn_cleanup_task;
