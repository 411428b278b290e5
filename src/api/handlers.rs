//! API Handlers
//!
//! HTTP request handlers for each feed endpoint. Writes return as soon as the
//! source of truth accepts them; their cache corrections keep running in the
//! background.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::MemoryStore;
use crate::config::Config;
use crate::error::{FeedError, Result};
use crate::feed::{
    CachedPost, FeedCache, FeedCacheSettings, FeedPage, PageRequest, PaginationResolver,
};
use crate::models::{
    CreatePostRequest, CreateReplyRequest, DeleteResponse, HealthResponse, LikeRequest, PageQuery,
    StatsResponse,
};
use crate::service::FeedService;
use crate::source::{LikeToggle, MemoryPostStore, PostWithReplies, Reply, UserProfile};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FeedService>,
    /// Backing cache store, for stats and the cleanup task
    pub store: Arc<MemoryStore>,
    /// Page size when a feed request has no `limit`
    pub feed_page_size: usize,
    /// Replies per page when a post request has no `limit`
    pub reply_page_size: usize,
    /// Largest accepted `limit`
    pub max_page_size: usize,
}

impl AppState {
    /// Wires the service over the given stores.
    pub fn new(config: &Config, store: Arc<MemoryStore>, posts: Arc<MemoryPostStore>) -> Self {
        let cache = Arc::new(FeedCache::new(
            store.clone(),
            posts.clone(),
            FeedCacheSettings::from_config(config),
        ));
        let resolver =
            PaginationResolver::new(cache.clone(), posts.clone(), config.pagination_fallback);

        Self {
            service: Arc::new(FeedService::new(posts, cache, resolver)),
            store,
            feed_page_size: config.feed_page_size,
            reply_page_size: config.reply_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Creates a new AppState with empty in-memory stores.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryPostStore::new()),
        )
    }
}

/// Handler for GET /feed
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedPage>> {
    let (page, limit) = query
        .resolve(state.feed_page_size, state.max_page_size)
        .map_err(FeedError::InvalidRequest)?;

    let page = state.service.feed(PageRequest::new(page, limit)?).await?;
    Ok(Json(page))
}

/// Handler for POST /posts
pub async fn create_post_handler(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<CachedPost>)> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    let receipt = state
        .service
        .create_post(req.author.trim(), &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt.into_value())))
}

/// Handler for GET /posts/:id
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostWithReplies>> {
    let (page, limit) = query
        .resolve(state.reply_page_size, state.max_page_size)
        .map_err(FeedError::InvalidRequest)?;

    let post = state
        .service
        .get_post(&post_id, PageRequest::new(page, limit)?)
        .await?;
    Ok(Json(post))
}

/// Handler for DELETE /posts/:id
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let receipt = state.service.delete_post(&post_id).await?;
    Ok(Json(DeleteResponse::new(receipt.into_value())))
}

/// Handler for POST /posts/:id/like
pub async fn like_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<LikeRequest>,
) -> Result<Json<LikeToggle>> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    let receipt = state
        .service
        .toggle_post_like(&post_id, req.user.trim())
        .await?;
    Ok(Json(receipt.into_value()))
}

/// Handler for POST /posts/:id/replies
pub async fn create_reply_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<CreateReplyRequest>,
) -> Result<(StatusCode, Json<Reply>)> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    let receipt = state
        .service
        .create_reply(&post_id, req.author.trim(), &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt.into_value())))
}

/// Handler for DELETE /replies/:id
pub async fn delete_reply_handler(
    State(state): State<AppState>,
    Path(reply_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let receipt = state.service.delete_reply(&reply_id).await?;
    Ok(Json(DeleteResponse::new(receipt.into_value().id)))
}

/// Handler for POST /replies/:id/like
pub async fn like_reply_handler(
    State(state): State<AppState>,
    Path(reply_id): Path<String>,
    Json(req): Json<LikeRequest>,
) -> Result<Json<LikeToggle>> {
    if let Some(error_msg) = req.validate() {
        return Err(FeedError::InvalidRequest(error_msg));
    }

    let toggle = state
        .service
        .toggle_reply_like(&reply_id, req.user.trim())
        .await?;
    Ok(Json(toggle))
}

/// Handler for GET /users/:username
pub async fn user_profile_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.service.user_profile(&username).await?))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        feed: state.service.cache().stats().snapshot(),
        store: state.store.stats().await.into(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
