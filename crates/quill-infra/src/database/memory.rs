//! In-memory post repository - used as fallback when no database is configured.
//!
//! Mutations take the write lock, so they are atomic with respect to each
//! other just like the conditional updates of the SQL backend.
//! Note: Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quill_core::domain::{AuthorPostCount, NewPost, Page, PageRequest, Post, PostFilter, PostPatch};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

#[derive(Default)]
struct MemStore {
    posts: BTreeMap<i64, Post>,
    next_id: i64,
}

impl MemStore {
    fn active(&self) -> Vec<Post> {
        self.posts
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect()
    }
}

/// In-memory post store over a map with an async RwLock.
pub struct InMemoryPostRepository {
    store: RwLock<MemStore>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(MemStore::default()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids grow with insertion order, so they break created-at ties newest-first.
fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn most_viewed_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(b.id.cmp(&a.id)));
}

fn matches(post: &Post, filter: &PostFilter) -> bool {
    if let Some(title) = filter.title.as_deref() {
        if !post.title.contains(title) {
            return false;
        }
    }
    if let Some(author) = filter.author.as_deref() {
        if post.author.as_deref() != Some(author) {
            return false;
        }
    }
    if let Some(start) = filter.start {
        if post.created_at < start {
            return false;
        }
    }
    if let Some(end) = filter.end {
        if post.created_at > end {
            return false;
        }
    }
    true
}

/// Slice one page out of an already-ordered result set. A size of 0 yields
/// an empty page with zero total pages.
fn page_of(items: Vec<Post>, page: PageRequest) -> Page<Post> {
    let total_items = items.len() as u64;
    if page.size == 0 {
        return Page {
            items: Vec::new(),
            page: page.page,
            page_size: 0,
            total_items,
            total_pages: 0,
        };
    }

    let total_pages = total_items.div_ceil(page.size);
    let start = page.page.saturating_mul(page.size);
    let items = items
        .into_iter()
        .skip(start as usize)
        .take(page.size as usize)
        .collect();

    Page {
        items,
        page: page.page,
        page_size: page.size,
        total_items,
        total_pages,
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, input: NewPost) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        store.next_id += 1;
        let post = Post {
            id: store.next_id,
            title: input.title,
            content: input.content,
            author: input.author,
            view_count: 0,
            is_deleted: false,
            created_at: Utc::now(),
        };
        store.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.get(&id).cloned())
    }

    async fn find_active(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts = store.active();
        newest_first(&mut posts);
        Ok(page_of(posts, page))
    }

    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .values()
            .filter(|p| p.title.contains(keyword) || p.content.contains(keyword))
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .posts
            .values()
            .filter(|p| p.is_active() && matches(p, filter))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(page_of(posts, page))
    }

    async fn find_popular(
        &self,
        min_view_count: i64,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .posts
            .values()
            .filter(|p| p.is_active() && p.view_count >= min_view_count)
            .cloned()
            .collect();
        most_viewed_first(&mut posts);
        Ok(page_of(posts, page))
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts = store.active();
        newest_first(&mut posts);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn find_most_viewed(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts = store.active();
        most_viewed_first(&mut posts);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .posts
            .values()
            .filter(|p| p.is_active() && p.author.as_deref() == Some(author))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn find_recent_by_author(
        &self,
        author: &str,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.find_by_author(author).await?;
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn find_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .values()
            .filter(|p| p.created_at >= start && p.created_at <= end)
            .cloned()
            .collect())
    }

    async fn find_views_above(
        &self,
        threshold: i64,
        sorted: bool,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .posts
            .values()
            .filter(|p| p.is_active() && p.view_count > threshold)
            .cloned()
            .collect();
        if sorted {
            most_viewed_first(&mut posts);
        }
        Ok(posts)
    }

    async fn increment_view_count(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        match store.posts.get_mut(&id) {
            Some(post) if post.is_active() => {
                post.view_count += 1;
                Ok(Some(post.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        match store.posts.get_mut(&id) {
            Some(post) if post.is_active() => {
                post.is_deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_content(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        match store.posts.get_mut(&id) {
            Some(post) if post.is_active() => {
                post.title = patch.title;
                post.content = patch.content;
                Ok(Some(post.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.values().filter(|p| p.is_active()).count() as u64)
    }

    async fn count_by_author(&self) -> Result<Vec<AuthorPostCount>, RepoError> {
        let store = self.store.read().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for post in store.posts.values().filter(|p| p.is_active()) {
            if let Some(author) = &post.author {
                *counts.entry(author.clone()).or_default() += 1;
            }
        }

        let mut rows: Vec<AuthorPostCount> = counts
            .into_iter()
            .map(|(author, count)| AuthorPostCount { author, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.author.cmp(&b.author)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(title: &str, author: Option<&str>) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: format!("{title} body"),
            author: author.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryPostRepository::new();
        let first = repo.insert(new_post("one", None)).await.unwrap();
        let second = repo.insert(new_post("two", None)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.view_count, 0);
        assert!(!first.is_deleted);
    }

    #[tokio::test]
    async fn test_find_by_id_returns_deleted_records() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(new_post("one", None)).await.unwrap();
        assert!(repo.soft_delete(post.id).await.unwrap());

        let found = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert!(found.is_deleted);
    }

    #[tokio::test]
    async fn test_page_of_size_zero_is_empty() {
        let repo = InMemoryPostRepository::new();
        for i in 0..3 {
            repo.insert(new_post(&format!("p{i}"), None)).await.unwrap();
        }

        let page = repo.find_active(PageRequest::new(0, 0)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_keyword_search_covers_title_and_content() {
        let repo = InMemoryPostRepository::new();
        repo.insert(new_post("Rust pinning", None)).await.unwrap();
        repo.insert(NewPost {
            title: "Unrelated".to_string(),
            content: "all about Rust futures".to_string(),
            author: None,
        })
        .await
        .unwrap();
        repo.insert(new_post("Gardening", None)).await.unwrap();

        let found = repo.search_by_keyword("Rust").await.unwrap();
        assert_eq!(found.len(), 2);
    }
}
