//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// Request to replace a post's title and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
}

/// Response containing a post's public representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub is_deleted: bool,
    pub created_at: String,
}

/// One page of responses, with paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Per-author post count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorCountResponse {
    pub author: String,
    pub count: i64,
}

/// Scalar count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

fn default_page_size() -> u64 {
    10
}

/// Pagination query parameters. Page is 0-based; defaults are page 0, size 10.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

/// Free-text search query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordQuery {
    pub keyword: String,
}

/// Composite search query parameters; every filter is optional.
/// Timestamps are RFC 3339.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvancedSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

/// Popular-posts query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PopularQuery {
    #[serde(default)]
    pub min_view_count: i64,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

/// Creation-date range query parameters; both bounds required, inclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// View-count threshold query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewsAboveQuery {
    pub threshold: i64,
    #[serde(default)]
    pub sorted: bool,
}
