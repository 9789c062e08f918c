use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AuthorPostCount, NewPost, Page, PageRequest, Post, PostFilter, PostPatch};
use crate::error::RepoError;

/// Post store contract.
///
/// Point lookups return records regardless of the delete flag; deletion
/// filtering is the service's decision except where a method says "active".
/// Mutations are single atomic statements at the store, so two concurrent
/// soft-deletes of one id cannot both report success and concurrent viewers
/// never lose increments.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post; the store assigns id and creation timestamp.
    async fn insert(&self, input: NewPost) -> Result<Post, RepoError>;

    /// Point lookup by id, deleted records included.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Active records only, newest first.
    async fn find_active(&self, page: PageRequest) -> Result<Page<Post>, RepoError>;

    /// Substring match on title OR content, over all records.
    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Post>, RepoError>;

    /// Composite AND search over active records, newest first.
    async fn search(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Active records with `view_count >= min_view_count`, most viewed first.
    async fn find_popular(
        &self,
        min_view_count: i64,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Up to `limit` active records, newest first.
    async fn find_recent(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Up to `limit` active records, most viewed first.
    async fn find_most_viewed(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Active records by the given author, newest first.
    async fn find_by_author(&self, author: &str) -> Result<Vec<Post>, RepoError>;

    /// Up to `limit` active records by the given author, newest first.
    async fn find_recent_by_author(
        &self,
        author: &str,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// All records created in the inclusive range, deleted included.
    async fn find_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError>;

    /// Active records with `view_count > threshold`; most viewed first when
    /// `sorted`, store order otherwise.
    async fn find_views_above(
        &self,
        threshold: i64,
        sorted: bool,
    ) -> Result<Vec<Post>, RepoError>;

    /// Atomic conditional increment. Returns the post-increment record, or
    /// `None` when the id is absent or the record is deleted.
    async fn increment_view_count(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Atomic conditional flag flip. Returns `false` when the id is absent
    /// or the record was already deleted.
    async fn soft_delete(&self, id: i64) -> Result<bool, RepoError>;

    /// Atomic conditional replace of title/content. Returns the updated
    /// record, or `None` when the id is absent or the record is deleted.
    async fn update_content(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, RepoError>;

    /// Number of active records.
    async fn count_active(&self) -> Result<u64, RepoError>;

    /// Active records with a known author, grouped, by count descending.
    async fn count_by_author(&self) -> Result<Vec<AuthorPostCount>, RepoError>;
}
