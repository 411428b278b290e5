//! Request DTOs for the feed API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Longest accepted post or reply body, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

fn validate_content(content: &str) -> Option<String> {
    let chars = content.trim().chars().count();
    if chars == 0 {
        return Some("Content cannot be empty".to_string());
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Some(format!(
            "Content exceeds maximum length of {} characters",
            MAX_CONTENT_CHARS
        ));
    }
    None
}

fn validate_name(field: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{} cannot be empty", field));
    }
    None
}

/// Paging query string of `GET /feed` and `GET /posts/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    #[serde(default)]
    pub page: Option<usize>,
    /// Page size (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PageQuery {
    /// Resolves defaults and checks bounds, returning `(page, limit)`.
    pub fn resolve(
        &self,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<(usize, usize), String> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(default_limit);

        if page == 0 {
            return Err("page must be at least 1".to_string());
        }
        if limit == 0 || limit > max_limit {
            return Err(format!("limit must be between 1 and {}", max_limit));
        }
        Ok((page, limit))
    }
}

/// Request body of `POST /posts`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    /// Display name of the author
    pub author: String,
    /// Post body
    pub content: String,
}

impl CreatePostRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_name("Author", &self.author).or_else(|| validate_content(&self.content))
    }
}

/// Request body of `POST /posts/:id/replies`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReplyRequest {
    pub author: String,
    pub content: String,
}

impl CreateReplyRequest {
    pub fn validate(&self) -> Option<String> {
        validate_name("Author", &self.author).or_else(|| validate_content(&self.content))
    }
}

/// Request body of the like toggles
#[derive(Debug, Clone, Deserialize)]
pub struct LikeRequest {
    /// User toggling the like
    pub user: String,
}

impl LikeRequest {
    pub fn validate(&self) -> Option<String> {
        validate_name("User", &self.user)
    }
}
