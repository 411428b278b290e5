//! Feed Entry Module
//!
//! The aggregate stored under the feed key: a bounded, newest-first list of
//! posts. All ordering, bounding and uniqueness rules live here so that every
//! mutation leaves the list valid when it returns.

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::feed::{CachedPost, CountDelta};

// == Feed Entry ==
/// Newest-first list of cached posts.
///
/// Invariants after every method returns:
/// - at most `max_posts` posts (the bound passed to the mutating call);
/// - strictly descending by [`CachedPost::feed_order`];
/// - each id at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    posts: Vec<CachedPost>,
    /// True while the list holds every post of the feed, i.e. the snapshot it
    /// was built from was shorter than the bound and nothing has been evicted
    /// since. Pages ending past the tail of an incomplete entry cannot be
    /// answered from it.
    #[serde(default)]
    complete: bool,
}

impl FeedEntry {
    /// Builds an entry from a source snapshot, normalizing order and bound.
    pub fn from_snapshot(mut posts: Vec<CachedPost>, max_posts: usize) -> Self {
        posts.sort_by(|a, b| b.feed_order().cmp(&a.feed_order()));
        posts.dedup_by(|a, b| a.id == b.id);

        let complete = posts.len() < max_posts;
        posts.truncate(max_posts);
        Self { posts, complete }
    }

    /// Inserts `post` at its place in the order (the head for a new post) and
    /// drops posts from the tail beyond `max_posts`.
    ///
    /// A post whose id is already present replaces the old copy. Returns the
    /// number of evicted posts.
    pub fn push(&mut self, post: CachedPost, max_posts: usize) -> usize {
        self.posts.retain(|p| p.id != post.id);

        let at = self
            .posts
            .partition_point(|p| p.feed_order() > post.feed_order());
        self.posts.insert(at, post);

        let evicted = self.posts.len().saturating_sub(max_posts);
        if evicted > 0 {
            self.posts.truncate(max_posts);
            self.complete = false;
        }
        evicted
    }

    /// Removes the post with `id`; returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.posts.len() != before
    }

    /// Applies `delta` to the post with `id`; returns whether it was present.
    pub fn apply_delta(&mut self, id: &str, delta: CountDelta) -> bool {
        match self.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                delta.apply_to(post);
                true
            }
            None => false,
        }
    }

    pub fn posts(&self) -> &[CachedPost] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<CachedPost> {
        self.posts
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    // == Serialization ==
    pub fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes an entry. A bare post array, as written by writers that do not
    /// track completeness, is accepted and treated as incomplete.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CacheError> {
        let entry = match serde_json::from_slice(bytes)? {
            StoredFeed::Entry(entry) => entry,
            StoredFeed::Posts(mut posts) => {
                posts.sort_by(|a, b| b.feed_order().cmp(&a.feed_order()));
                posts.dedup_by(|a, b| a.id == b.id);
                Self {
                    posts,
                    complete: false,
                }
            }
        };
        Ok(entry)
    }
}

/// Shapes the feed key may hold.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFeed {
    Entry(FeedEntry),
    Posts(Vec<CachedPost>),
}
