//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired keys from the in-memory cache store
//! - Cache updates: best-effort feed corrections spawned after each write

mod cleanup;
mod updates;

pub use cleanup::spawn_cleanup_task;
pub use updates::{spawn_cache_update, WriteReceipt};
