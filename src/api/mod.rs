//! API Module
//!
//! HTTP handlers and routing for the feed REST API.
//!
//! # Endpoints
//! - `GET /feed?page=&limit=` - One page of the feed, newest first
//! - `POST /posts` - Create a post
//! - `GET /posts/:id?page=&limit=` - A post with one page of its replies
//! - `DELETE /posts/:id` - Delete a post and its replies
//! - `POST /posts/:id/like` - Toggle a like on a post
//! - `POST /posts/:id/replies` - Reply to a post
//! - `DELETE /replies/:id` - Delete a reply
//! - `POST /replies/:id/like` - Toggle a like on a reply
//! - `GET /users/:username` - Post and reply counts plus recent posts
//! - `GET /stats` - Feed cache and store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
