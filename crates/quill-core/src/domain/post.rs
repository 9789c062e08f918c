use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - represents a blog post.
///
/// The store assigns `id` and `created_at` on insert. `view_count` only ever
/// grows, and `is_deleted` only ever flips from false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// True when the post is visible to "active" listings and searches.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Input for creating a post. The store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
}

/// Full replacement of a post's editable fields.
#[derive(Debug, Clone)]
pub struct PostPatch {
    pub title: String,
    pub content: String,
}

/// Composite search predicate. Absent fields are wildcards; present fields
/// combine with logical AND. An inverted date range matches nothing.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Per-author statistics row, ordered by count descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPostCount {
    pub author: String,
    pub count: i64,
}
