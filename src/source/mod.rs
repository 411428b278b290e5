//! Source of Truth
//!
//! The authoritative store of posts, replies and likes. The feed cache reads
//! from it through [`PostSource`]; the write paths go through
//! [`PostRepository`], whose every method is one atomic transaction.

mod memory;
mod records;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::feed::CachedPost;

pub use memory::MemoryPostStore;
pub use records::{
    LikeToggle, PostWithReplies, Reply, ReplyPagination, UserProfile, RECENT_POSTS_ON_PROFILE,
};

/// Read access used by the feed cache and pagination fallback.
#[async_trait]
pub trait PostSource: Send + Sync + 'static {
    /// Up to `limit` most recent posts, newest first.
    async fn list_recent_posts(&self, limit: usize) -> Result<Vec<CachedPost>, SourceError>;

    /// Posts newest first, skipping `offset` and taking at most `limit`.
    async fn list_posts(&self, offset: usize, limit: usize)
        -> Result<Vec<CachedPost>, SourceError>;
}

/// Transactional writes plus point lookups.
#[async_trait]
pub trait PostRepository: PostSource {
    async fn create_post(&self, author: &str, content: &str) -> Result<CachedPost, SourceError>;

    async fn find_post(&self, post_id: &str) -> Result<CachedPost, SourceError>;

    /// Replies of a post newest first, skipping `offset` and taking at most
    /// `limit`.
    async fn list_replies(
        &self,
        post_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Reply>, SourceError>;

    /// Deletes the post together with its replies and every like on either.
    async fn delete_post(&self, post_id: &str) -> Result<(), SourceError>;

    /// Likes the post for `user`, or unlikes it if already liked.
    async fn toggle_post_like(&self, post_id: &str, user: &str)
        -> Result<LikeToggle, SourceError>;

    /// Creates a reply and increments the parent's reply counter.
    async fn create_reply(
        &self,
        post_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Reply, SourceError>;

    /// Deletes a reply and its likes, decrementing the parent's reply counter.
    /// Returns the deleted reply.
    async fn delete_reply(&self, reply_id: &str) -> Result<Reply, SourceError>;

    async fn toggle_reply_like(&self, reply_id: &str, user: &str)
        -> Result<LikeToggle, SourceError>;

    /// Post and reply counts of `username` plus their most recent posts.
    /// Unknown when the user has written nothing.
    async fn user_profile(&self, username: &str) -> Result<UserProfile, SourceError>;
}
