//! Feed data model
//!
//! The denormalized post record stored in the feed cache and the counter
//! deltas applied to it after writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Cached Post ==
/// A post as it appears in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPost {
    /// Opaque, stable identifier
    pub id: String,
    /// Post body (1-500 characters, validated before it gets here)
    pub content: String,
    /// Author display name, copied when the post is written
    pub author_username: String,
    /// Creation time; defines feed order and never changes
    pub created_at: DateTime<Utc>,
    pub likes_count: u32,
    pub replies_count: u32,
}

impl CachedPost {
    /// Key the feed is ordered by, newest first.
    ///
    /// The id breaks ties between posts created in the same instant so the
    /// order stays total.
    pub fn feed_order(&self) -> (DateTime<Utc>, &str) {
        (self.created_at, self.id.as_str())
    }
}

// == Count Delta ==
/// Counter change to apply to a cached post.
///
/// `likes_count` is the new authoritative total; `replies_count_change` is an
/// increment or decrement relative to the cached value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDelta {
    pub likes_count: Option<u32>,
    pub replies_count_change: Option<i32>,
}

impl CountDelta {
    /// Sets the likes counter to `total`.
    pub fn likes(total: u32) -> Self {
        Self {
            likes_count: Some(total),
            ..Self::default()
        }
    }

    /// Moves the replies counter by `change`.
    pub fn replies(change: i32) -> Self {
        Self {
            replies_count_change: Some(change),
            ..Self::default()
        }
    }

    /// Applies the delta in place. Replies never drop below zero.
    pub fn apply_to(&self, post: &mut CachedPost) {
        if let Some(total) = self.likes_count {
            post.likes_count = total;
        }
        if let Some(change) = self.replies_count_change {
            post.replies_count = post.replies_count.saturating_add_signed(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> CachedPost {
        CachedPost {
            id: "p1".to_string(),
            content: "hello".to_string(),
            author_username: "octocat".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            likes_count: 3,
            replies_count: 1,
        }
    }

    #[test]
    fn test_cached_post_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["authorUsername"], "octocat");
        assert_eq!(json["likesCount"], 3);
        assert_eq!(json["repliesCount"], 1);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_likes_delta_is_absolute() {
        let mut post = sample();
        CountDelta::likes(5).apply_to(&mut post);
        assert_eq!(post.likes_count, 5);
        assert_eq!(post.replies_count, 1);
    }

    #[test]
    fn test_replies_delta_is_relative() {
        let mut post = sample();
        CountDelta::replies(2).apply_to(&mut post);
        assert_eq!(post.replies_count, 3);
        CountDelta::replies(-1).apply_to(&mut post);
        assert_eq!(post.replies_count, 2);
        assert_eq!(post.likes_count, 3);
    }

    #[test]
    fn test_replies_delta_saturates_at_zero() {
        let mut post = sample();
        CountDelta::replies(-4).apply_to(&mut post);
        assert_eq!(post.replies_count, 0);
    }
}
