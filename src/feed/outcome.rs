//! Result of a best-effort cache operation.

use crate::error::CacheError;

/// What happened to the cached feed entry.
///
/// None of these variants is a failure of the caller's request: the source of
/// truth has already been written, and an entry that missed an update heals on
/// the next warm-up or when its TTL runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The entry was written
    Applied,
    /// Nothing needed writing
    Skipped(SkipReason),
    /// The cache store failed or timed out; the entry may now be stale
    Unavailable(CacheError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No feed entry is cached; the next read warms it
    EntryAbsent,
    /// The addressed post is not in the cached entry
    NotCached,
    /// The source of truth had no posts to cache
    EmptySnapshot,
}

impl CacheOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CacheOutcome::Applied)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheOutcome::Unavailable(_))
    }
}
