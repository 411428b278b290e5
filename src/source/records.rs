//! Records owned by the source of truth that never enter the feed cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::CachedPost;

/// A reply to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: u32,
}

/// State of a like after toggling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    /// True when the toggle added a like
    pub liked: bool,
    /// Authoritative like total after the toggle
    pub likes_count: u32,
}

/// A post with one page of its replies, newest reply first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithReplies {
    #[serde(flatten)]
    pub post: CachedPost,
    pub replies: Vec<Reply>,
    pub pagination: ReplyPagination,
}

/// Paging metadata of the replies in [`PostWithReplies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPagination {
    pub current_page: usize,
    pub limit: usize,
    pub has_next_page: bool,
    pub total_replies_on_page: usize,
}

/// Public summary of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub posts_count: usize,
    pub replies_count: usize,
    /// Newest first, at most [`RECENT_POSTS_ON_PROFILE`]
    pub recent_posts: Vec<CachedPost>,
}

/// Number of posts shown on a profile.
pub const RECENT_POSTS_ON_PROFILE: usize = 5;
