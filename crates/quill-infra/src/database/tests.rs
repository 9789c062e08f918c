//! Service behavior tests over the in-memory store, plus query-mapping
//! tests for the Postgres repository against a mock database.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;

use quill_core::domain::{NewPost, Page, PageRequest, Post, PostFilter, PostPatch};
use quill_core::ports::PostRepository;
use quill_core::service::PostService;

use super::memory::InMemoryPostRepository;

fn harness() -> (Arc<InMemoryPostRepository>, PostService) {
    let repo = Arc::new(InMemoryPostRepository::new());
    let service = PostService::new(repo.clone());
    (repo, service)
}

fn new_post(title: &str, author: Option<&str>) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("{title} body"),
        author: author.map(String::from),
    }
}

fn patch(title: &str, content: &str) -> PostPatch {
    PostPatch {
        title: title.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_unknown_id_reports_absent_everywhere() {
    let (_, service) = harness();

    assert!(service.view(42).await.unwrap().is_none());
    assert!(service.update(42, patch("t", "c")).await.unwrap().is_none());
    assert!(!service.soft_delete(42).await.unwrap());
}

#[tokio::test]
async fn test_view_increments_by_exactly_one() {
    let (repo, service) = harness();
    let created = service.create(new_post("fresh", None)).await.unwrap();
    assert_eq!(created.view_count, 0);

    let viewed = service.view(created.id).await.unwrap().unwrap();
    assert_eq!(viewed.view_count, 1);

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.view_count, 1);

    let viewed = service.view(created.id).await.unwrap().unwrap();
    assert_eq!(viewed.view_count, 2);
}

#[tokio::test]
async fn test_view_of_deleted_post_never_increments() {
    let (repo, service) = harness();
    let created = service.create(new_post("gone", None)).await.unwrap();
    service.view(created.id).await.unwrap();
    assert!(service.soft_delete(created.id).await.unwrap());

    for _ in 0..3 {
        let viewed = service.view(created.id).await.unwrap().unwrap();
        assert!(viewed.is_deleted);
        assert_eq!(viewed.view_count, 1);
    }

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.view_count, 1);
}

#[tokio::test]
async fn test_soft_delete_is_one_way_and_reported_once() {
    let (_, service) = harness();
    let created = service.create(new_post("doomed", None)).await.unwrap();

    assert!(service.soft_delete(created.id).await.unwrap());
    assert!(!service.soft_delete(created.id).await.unwrap());

    let listed = service.list(PageRequest::default()).await.unwrap();
    assert!(listed.items.iter().all(|p| p.id != created.id));
}

#[tokio::test]
async fn test_update_on_deleted_post_is_absent_and_harmless() {
    let (repo, service) = harness();
    let created = service.create(new_post("original", None)).await.unwrap();
    assert!(service.soft_delete(created.id).await.unwrap());

    let result = service
        .update(created.id, patch("changed", "changed"))
        .await
        .unwrap();
    assert!(result.is_none());

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "original");
    assert_eq!(stored.content, "original body");
}

#[tokio::test]
async fn test_update_replaces_title_and_content() {
    let (repo, service) = harness();
    let created = service.create(new_post("before", None)).await.unwrap();

    let updated = service
        .update(created.id, patch("after", "new body"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "after");
    assert_eq!(updated.content, "new body");

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "after");
    assert_eq!(stored.created_at, created.created_at);
}

#[tokio::test]
async fn test_list_pages_newest_first_without_overlap() {
    let (_, service) = harness();
    for i in 1..=5 {
        service
            .create(new_post(&format!("post {i}"), None))
            .await
            .unwrap();
    }

    let first = service.list(PageRequest::new(0, 2)).await.unwrap();
    let second = service.list(PageRequest::new(1, 2)).await.unwrap();
    let third = service.list(PageRequest::new(2, 2)).await.unwrap();

    let ids = |page: &Page<Post>| page.items.iter().map(|p| p.id).collect::<Vec<_>>();

    assert_eq!(ids(&first), vec![5, 4]);
    assert_eq!(ids(&second), vec![3, 2]);
    assert_eq!(ids(&third), vec![1]);
    assert_eq!(first.total_items, 5);
    assert_eq!(first.total_pages, 3);
}

#[tokio::test]
async fn test_search_title_substring_is_case_preserving() {
    let (_, service) = harness();
    let foo_bar = service.create(new_post("Foo Bar", None)).await.unwrap();
    service.create(new_post("Baz", None)).await.unwrap();
    let foobaz = service.create(new_post("Foobaz", None)).await.unwrap();

    let filter = PostFilter {
        title: Some("Foo".to_string()),
        ..Default::default()
    };
    let found = service.search(filter, PageRequest::default()).await.unwrap();

    let mut ids: Vec<i64> = found.items.iter().map(|p| p.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![foo_bar.id, foobaz.id]);
}

#[tokio::test]
async fn test_search_with_inverted_range_matches_nothing() {
    let (_, service) = harness();
    let created = service.create(new_post("ranged", None)).await.unwrap();

    let filter = PostFilter {
        start: Some(created.created_at + Duration::hours(1)),
        end: Some(created.created_at - Duration::hours(1)),
        ..Default::default()
    };
    let found = service.search(filter, PageRequest::default()).await.unwrap();

    assert!(found.items.is_empty());
    assert_eq!(found.total_items, 0);
}

#[tokio::test]
async fn test_search_combines_filters_with_and() {
    let (_, service) = harness();
    let hit = service
        .create(new_post("Release notes", Some("alice")))
        .await
        .unwrap();
    service
        .create(new_post("Release notes", Some("bob")))
        .await
        .unwrap();
    service
        .create(new_post("Meeting notes", Some("alice")))
        .await
        .unwrap();

    let filter = PostFilter {
        title: Some("Release".to_string()),
        author: Some("alice".to_string()),
        ..Default::default()
    };
    let found = service.search(filter, PageRequest::default()).await.unwrap();

    assert_eq!(found.total_items, 1);
    assert_eq!(found.items[0].id, hit.id);
}

#[tokio::test]
async fn test_concurrent_viewers_never_lose_or_share_increments() {
    let (repo, service) = harness();
    let created = service.create(new_post("hot", None)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        let id = created.id;
        handles.push(tokio::spawn(async move {
            service.view(id).await.unwrap().unwrap().view_count
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        let observed = handle.await.unwrap();
        assert!(seen.insert(observed), "colliding view count {observed}");
    }

    assert!((1..=20).all(|v| seen.contains(&v)));
    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.view_count, 20);
}

#[tokio::test]
async fn test_popular_filters_and_orders_by_view_count() {
    let (_, service) = harness();
    let hit = service.create(new_post("hit", None)).await.unwrap();
    let mid = service.create(new_post("mid", None)).await.unwrap();
    service.create(new_post("cold", None)).await.unwrap();

    for _ in 0..3 {
        service.view(hit.id).await.unwrap();
    }
    service.view(mid.id).await.unwrap();

    let page = service.popular(1, PageRequest::default()).await.unwrap();
    let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![hit.id, mid.id]);
    assert_eq!(page.total_items, 2);
}

#[tokio::test]
async fn test_views_above_is_strictly_greater() {
    let (_, service) = harness();
    let hit = service.create(new_post("hit", None)).await.unwrap();
    let mid = service.create(new_post("mid", None)).await.unwrap();

    for _ in 0..3 {
        service.view(hit.id).await.unwrap();
    }
    service.view(mid.id).await.unwrap();

    let above = service.views_above(1, true).await.unwrap();
    assert_eq!(above.len(), 1);
    assert_eq!(above[0].id, hit.id);
}

#[tokio::test]
async fn test_recent_is_bounded_to_ten() {
    let (_, service) = harness();
    for i in 1..=12 {
        service
            .create(new_post(&format!("post {i}"), None))
            .await
            .unwrap();
    }

    let recent = service.recent().await.unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent.first().unwrap().id, 12);
    assert_eq!(recent.last().unwrap().id, 3);
}

#[tokio::test]
async fn test_by_author_excludes_deleted() {
    let (_, service) = harness();
    let kept = service
        .create(new_post("kept", Some("alice")))
        .await
        .unwrap();
    let dropped = service
        .create(new_post("dropped", Some("alice")))
        .await
        .unwrap();
    assert!(service.soft_delete(dropped.id).await.unwrap());

    let posts = service.by_author("alice").await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, kept.id);
}

#[tokio::test]
async fn test_author_counts_ordered_and_exclude_deleted() {
    let (_, service) = harness();
    for i in 0..3 {
        service
            .create(new_post(&format!("a{i}"), Some("alice")))
            .await
            .unwrap();
    }
    service.create(new_post("b0", Some("bob"))).await.unwrap();
    service.create(new_post("anon", None)).await.unwrap();

    let extra = service
        .create(new_post("a3", Some("alice")))
        .await
        .unwrap();
    assert!(service.soft_delete(extra.id).await.unwrap());

    let counts = service.count_by_author().await.unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].author, "alice");
    assert_eq!(counts[0].count, 3);
    assert_eq!(counts[1].author, "bob");
    assert_eq!(counts[1].count, 1);

    assert_eq!(service.active_count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_created_between_includes_deleted_records() {
    let (_, service) = harness();
    let first = service.create(new_post("first", None)).await.unwrap();
    let second = service.create(new_post("second", None)).await.unwrap();
    assert!(service.soft_delete(second.id).await.unwrap());

    let found = service
        .created_between(first.created_at, second.created_at)
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[cfg(feature = "postgres")]
mod postgres {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use quill_core::domain::Post;
    use quill_core::ports::PostRepository;

    use crate::database::entity::post;
    use crate::database::postgres_repo::PostgresPostRepository;

    fn model(id: i64, title: &str) -> post::Model {
        post::Model {
            id,
            title: title.to_owned(),
            content: "Content".to_owned(),
            author: Some("alice".to_owned()),
            view_count: 0,
            is_deleted: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model(7, "Test Post")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(7).await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.title, "Test Post");
        assert_eq!(found.id, 7);
    }

    #[tokio::test]
    async fn test_find_post_by_id_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert!(repo.find_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keyword_search_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model(1, "Foo Bar"), model(3, "Foobaz")]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let found = repo.search_by_keyword("Foo").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, 1);
        assert_eq!(found[1].id, 3);
    }

    #[tokio::test]
    async fn test_soft_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert!(repo.soft_delete(1).await.unwrap());
        assert!(!repo.soft_delete(1).await.unwrap());
    }
}
