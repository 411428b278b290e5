//! In-Memory Post Store
//!
//! Process-local source of truth. A single write lock around all tables makes
//! each repository call atomic, standing in for a relational transaction.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::SourceError;
use crate::feed::CachedPost;
use crate::source::{
    LikeToggle, PostRepository, PostSource, Reply, UserProfile, RECENT_POSTS_ON_PROFILE,
};

#[derive(Debug, Default)]
struct Tables {
    posts: HashMap<String, CachedPost>,
    replies: HashMap<String, Reply>,
    /// (post id, user)
    post_likes: HashSet<(String, String)>,
    /// (reply id, user)
    reply_likes: HashSet<(String, String)>,
    last_created: Option<DateTime<Utc>>,
}

impl Tables {
    /// Current time, nudged forward so creation times never repeat.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }

    fn newest_first(&self) -> Vec<&CachedPost> {
        let mut posts: Vec<&CachedPost> = self.posts.values().collect();
        posts.sort_by(|a, b| b.feed_order().cmp(&a.feed_order()));
        posts
    }

    fn post_mut(&mut self, post_id: &str) -> Result<&mut CachedPost, SourceError> {
        self.posts
            .get_mut(post_id)
            .ok_or_else(|| SourceError::NotFound(format!("post {}", post_id)))
    }
}

// == Memory Post Store ==
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    tables: RwLock<Tables>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed post, e.g. when seeding from another store.
    pub async fn insert_post(&self, post: CachedPost) {
        let mut tables = self.tables.write().await;
        if tables.last_created.map_or(true, |last| post.created_at > last) {
            tables.last_created = Some(post.created_at);
        }
        tables.posts.insert(post.id.clone(), post);
    }

    pub async fn post_count(&self) -> usize {
        self.tables.read().await.posts.len()
    }
}

#[async_trait]
impl PostSource for MemoryPostStore {
    async fn list_recent_posts(&self, limit: usize) -> Result<Vec<CachedPost>, SourceError> {
        self.list_posts(0, limit).await
    }

    async fn list_posts(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<CachedPost>, SourceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .newest_first()
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryPostStore {
    async fn create_post(&self, author: &str, content: &str) -> Result<CachedPost, SourceError> {
        let mut tables = self.tables.write().await;
        let post = CachedPost {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            author_username: author.to_string(),
            created_at: tables.next_timestamp(),
            likes_count: 0,
            replies_count: 0,
        };
        tables.posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: &str) -> Result<CachedPost, SourceError> {
        self.tables
            .read()
            .await
            .posts
            .get(post_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("post {}", post_id)))
    }

    async fn list_replies(
        &self,
        post_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Reply>, SourceError> {
        let tables = self.tables.read().await;
        if !tables.posts.contains_key(post_id) {
            return Err(SourceError::NotFound(format!("post {}", post_id)));
        }

        let mut replies: Vec<&Reply> = tables
            .replies
            .values()
            .filter(|r| r.post_id == post_id)
            .collect();
        replies.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(replies
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_post(&self, post_id: &str) -> Result<(), SourceError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(post_id).is_none() {
            return Err(SourceError::NotFound(format!("post {}", post_id)));
        }

        let reply_ids: HashSet<String> = tables
            .replies
            .values()
            .filter(|r| r.post_id == post_id)
            .map(|r| r.id.clone())
            .collect();
        tables.replies.retain(|id, _| !reply_ids.contains(id));
        tables.reply_likes.retain(|(id, _)| !reply_ids.contains(id));
        tables.post_likes.retain(|(id, _)| id != post_id);
        Ok(())
    }

    async fn toggle_post_like(
        &self,
        post_id: &str,
        user: &str,
    ) -> Result<LikeToggle, SourceError> {
        let mut tables = self.tables.write().await;
        tables.post_mut(post_id)?;

        let like = (post_id.to_string(), user.to_string());
        let liked = if tables.post_likes.remove(&like) {
            false
        } else {
            tables.post_likes.insert(like);
            true
        };

        let post = tables.post_mut(post_id)?;
        post.likes_count = if liked {
            post.likes_count.saturating_add(1)
        } else {
            post.likes_count.saturating_sub(1)
        };
        Ok(LikeToggle {
            liked,
            likes_count: post.likes_count,
        })
    }

    async fn create_reply(
        &self,
        post_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Reply, SourceError> {
        let mut tables = self.tables.write().await;
        tables.post_mut(post_id)?;

        let reply = Reply {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            content: content.to_string(),
            author_username: author.to_string(),
            created_at: tables.next_timestamp(),
            likes_count: 0,
        };
        tables.replies.insert(reply.id.clone(), reply.clone());

        let post = tables.post_mut(post_id)?;
        post.replies_count = post.replies_count.saturating_add(1);
        Ok(reply)
    }

    async fn delete_reply(&self, reply_id: &str) -> Result<Reply, SourceError> {
        let mut tables = self.tables.write().await;
        let reply = tables
            .replies
            .remove(reply_id)
            .ok_or_else(|| SourceError::NotFound(format!("reply {}", reply_id)))?;

        tables.reply_likes.retain(|(id, _)| id != reply_id);
        if let Some(post) = tables.posts.get_mut(&reply.post_id) {
            post.replies_count = post.replies_count.saturating_sub(1);
        }
        Ok(reply)
    }

    async fn toggle_reply_like(
        &self,
        reply_id: &str,
        user: &str,
    ) -> Result<LikeToggle, SourceError> {
        let mut tables = self.tables.write().await;
        if !tables.replies.contains_key(reply_id) {
            return Err(SourceError::NotFound(format!("reply {}", reply_id)));
        }

        let like = (reply_id.to_string(), user.to_string());
        let liked = !tables.reply_likes.remove(&like);
        if liked {
            tables.reply_likes.insert(like);
        }

        let reply = tables
            .replies
            .get_mut(reply_id)
            .ok_or_else(|| SourceError::NotFound(format!("reply {}", reply_id)))?;
        reply.likes_count = if liked {
            reply.likes_count.saturating_add(1)
        } else {
            reply.likes_count.saturating_sub(1)
        };
        Ok(LikeToggle {
            liked,
            likes_count: reply.likes_count,
        })
    }
    async fn user_profile(&self, username: &str) -> Result<UserProfile, SourceError> {
        let tables = self.tables.read().await;

        let posts: Vec<&CachedPost> = tables
            .newest_first()
            .into_iter()
            .filter(|p| p.author_username == username)
            .collect();
        let replies_count = tables
            .replies
            .values()
            .filter(|r| r.author_username == username)
            .count();
        if posts.is_empty() && replies_count == 0 {
            return Err(SourceError::NotFound(format!("user {}", username)));
        }

        Ok(UserProfile {
            username: username.to_string(),
            posts_count: posts.len(),
            replies_count,
            recent_posts: posts
                .into_iter()
                .take(RECENT_POSTS_ON_PROFILE)
                .cloned()
                .collect(),
        })
    }
}
