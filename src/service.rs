//! Feed Service
//!
//! Write and read paths over the source of truth and the feed cache. Every
//! write commits to the source of truth first; the cache correction that
//! follows is spawned and never decides the write's result.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::error::Result;
use crate::feed::{
    CacheOutcome, CachedPost, CountDelta, FeedCache, FeedPage, PageRequest, PaginationResolver,
};
use crate::source::{
    LikeToggle, PostRepository, PostWithReplies, Reply, ReplyPagination, UserProfile,
};
use crate::tasks::{spawn_cache_update, WriteReceipt};

pub struct FeedService {
    repo: Arc<dyn PostRepository>,
    cache: Arc<FeedCache>,
    resolver: PaginationResolver,
}

impl FeedService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: Arc<FeedCache>,
        resolver: PaginationResolver,
    ) -> Self {
        Self {
            repo,
            cache,
            resolver,
        }
    }

    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    // == Reads ==
    pub async fn feed(&self, request: PageRequest) -> Result<FeedPage> {
        self.resolver.get_page(request).await
    }

    /// A post with one page of replies, newest first. Replies never touch the
    /// feed cache.
    pub async fn get_post(&self, post_id: &str, request: PageRequest) -> Result<PostWithReplies> {
        let post = self.repo.find_post(post_id).await?;
        let mut replies = self
            .repo
            .list_replies(post_id, request.offset(), request.limit.saturating_add(1))
            .await?;

        let has_next_page = replies.len() > request.limit;
        replies.truncate(request.limit);
        Ok(PostWithReplies {
            post,
            pagination: ReplyPagination {
                current_page: request.page,
                limit: request.limit,
                has_next_page,
                total_replies_on_page: replies.len(),
            },
            replies,
        })
    }

    pub async fn user_profile(&self, username: &str) -> Result<UserProfile> {
        Ok(self.repo.user_profile(username).await?)
    }

    // == Writes ==
    pub async fn create_post(
        &self,
        author: &str,
        content: &str,
    ) -> Result<WriteReceipt<CachedPost>> {
        let post = self.repo.create_post(author, content).await?;
        info!(post_id = %post.id, author, "post created");

        let cache = self.cache.clone();
        let cached = post.clone();
        let cache_update =
            spawn_cache_update("push", post.id.clone(), async move { cache.push(cached).await });

        Ok(WriteReceipt {
            value: post,
            cache_update,
        })
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<WriteReceipt<String>> {
        self.repo.delete_post(post_id).await?;
        info!(post_id, "post deleted");

        let cache = self.cache.clone();
        let id = post_id.to_string();
        let target = id.clone();
        let cache_update = spawn_cache_update("remove", id.clone(), async move {
            cache.remove(&target).await
        });

        Ok(WriteReceipt {
            value: id,
            cache_update,
        })
    }

    /// Likes or unlikes a post; the cache receives the new authoritative total.
    pub async fn toggle_post_like(
        &self,
        post_id: &str,
        user: &str,
    ) -> Result<WriteReceipt<LikeToggle>> {
        let toggle = self.repo.toggle_post_like(post_id, user).await?;

        let delta = CountDelta::likes(toggle.likes_count);
        let cache_update = self.spawn_delta(post_id, delta);

        Ok(WriteReceipt {
            value: toggle,
            cache_update,
        })
    }

    pub async fn create_reply(
        &self,
        post_id: &str,
        author: &str,
        content: &str,
    ) -> Result<WriteReceipt<Reply>> {
        let reply = self.repo.create_reply(post_id, author, content).await?;
        info!(reply_id = %reply.id, post_id, "reply created");

        let cache_update = self.spawn_delta(post_id, CountDelta::replies(1));
        Ok(WriteReceipt {
            value: reply,
            cache_update,
        })
    }

    pub async fn delete_reply(&self, reply_id: &str) -> Result<WriteReceipt<Reply>> {
        let reply = self.repo.delete_reply(reply_id).await?;
        info!(reply_id, post_id = %reply.post_id, "reply deleted");

        let cache_update = self.spawn_delta(&reply.post_id, CountDelta::replies(-1));
        Ok(WriteReceipt {
            value: reply,
            cache_update,
        })
    }

    /// Reply likes are not part of the feed, so no cache work follows.
    pub async fn toggle_reply_like(&self, reply_id: &str, user: &str) -> Result<LikeToggle> {
        Ok(self.repo.toggle_reply_like(reply_id, user).await?)
    }

    fn spawn_delta(&self, post_id: &str, delta: CountDelta) -> JoinHandle<CacheOutcome> {
        let cache = self.cache.clone();
        let id = post_id.to_string();
        spawn_cache_update("apply_delta", id.clone(), async move {
            cache.apply_delta(&id, delta).await
        })
    }
}
