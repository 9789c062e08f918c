//! Post query service - the business policies over the post store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{AuthorPostCount, NewPost, Page, PageRequest, Post, PostFilter, PostPatch};
use crate::error::RepoError;
use crate::ports::PostRepository;

/// Bound for the recent-posts listing.
const RECENT_LIMIT: u64 = 10;
/// Bound for the most-viewed listing.
const MOST_VIEWED_LIMIT: u64 = 5;
/// Bound for the per-author recent listing.
const AUTHOR_RECENT_LIMIT: u64 = 5;

/// Stateless façade over the post store.
///
/// Visibility filtering and view-count semantics live here; the store is
/// injected once at construction and shared by reference.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: NewPost) -> Result<Post, RepoError> {
        self.repo.insert(input).await
    }

    /// Read a post by id, counting the view.
    ///
    /// An active post is returned with its post-increment view count; the
    /// increment is applied by the store in the same statement, so
    /// concurrent viewers each observe a distinct value. A deleted post is
    /// returned as-is and does not accrue views.
    pub async fn view(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let Some(post) = self.repo.find_by_id(id).await? else {
            return Ok(None);
        };
        if post.is_deleted {
            return Ok(Some(post));
        }
        match self.repo.increment_view_count(id).await? {
            Some(updated) => Ok(Some(updated)),
            // Soft-deleted between the lookup and the increment: no view
            // is recorded, return the record we read.
            None => Ok(Some(post)),
        }
    }

    /// Replace title and content. Absent and deleted posts both report
    /// `None`; the two are indistinguishable at this boundary.
    pub async fn update(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        self.repo.update_content(id, patch).await
    }

    /// Mark a post deleted. `false` when the id is unknown or the post was
    /// already deleted; at most one of any number of concurrent calls on
    /// the same id returns `true`.
    pub async fn soft_delete(&self, id: i64) -> Result<bool, RepoError> {
        self.repo.soft_delete(id).await
    }

    /// Active posts, newest first.
    pub async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        self.repo.find_active(page).await
    }

    /// Free-text substring search on title or content.
    pub async fn search_keyword(&self, keyword: &str) -> Result<Vec<Post>, RepoError> {
        self.repo.search_by_keyword(keyword).await
    }

    /// Composite search: title substring, exact author, creation-date range.
    pub async fn search(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        self.repo.search(&filter, page).await
    }

    /// Active posts at or above the view-count threshold, most viewed first.
    pub async fn popular(
        &self,
        min_view_count: i64,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        self.repo.find_popular(min_view_count, page).await
    }

    pub async fn recent(&self) -> Result<Vec<Post>, RepoError> {
        self.repo.find_recent(RECENT_LIMIT).await
    }

    pub async fn most_viewed(&self) -> Result<Vec<Post>, RepoError> {
        self.repo.find_most_viewed(MOST_VIEWED_LIMIT).await
    }

    pub async fn by_author(&self, author: &str) -> Result<Vec<Post>, RepoError> {
        self.repo.find_by_author(author).await
    }

    pub async fn recent_by_author(&self, author: &str) -> Result<Vec<Post>, RepoError> {
        self.repo
            .find_recent_by_author(author, AUTHOR_RECENT_LIMIT)
            .await
    }

    /// Posts created in the inclusive range, deleted ones included.
    pub async fn created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        self.repo.find_created_between(start, end).await
    }

    /// Active posts strictly above the view-count threshold.
    pub async fn views_above(&self, threshold: i64, sorted: bool) -> Result<Vec<Post>, RepoError> {
        self.repo.find_views_above(threshold, sorted).await
    }

    pub async fn active_count(&self) -> Result<u64, RepoError> {
        self.repo.count_active().await
    }

    pub async fn count_by_author(&self) -> Result<Vec<AuthorPostCount>, RepoError> {
        self.repo.count_by_author().await
    }
}
