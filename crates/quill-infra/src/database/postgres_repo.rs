//! PostgreSQL repository implementation.
//!
//! Mutations are single conditional statements (`UPDATE ... WHERE id = ?
//! AND NOT is_deleted`), so increments are never lost and a record cannot
//! be soft-deleted twice, without any locking in application code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[allow(unused_imports)]
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use quill_core::domain::{AuthorPostCount, NewPost, Page, PageRequest, Post, PostFilter, PostPatch};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Run a query paginated. A page size of 0 short-circuits to an empty
    /// page instead of reaching the paginator.
    async fn page_query(
        &self,
        query: Select<PostEntity>,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        if page.size == 0 {
            let total_items = query
                .count(&self.db)
                .await
                .map_err(|e| RepoError::Query(e.to_string()))?;
            return Ok(Page {
                items: Vec::new(),
                page: page.page,
                page_size: 0,
                total_items,
                total_pages: 0,
            });
        }

        let paginator = query.paginate(&self.db, page.size);
        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let models = paginator
            .fetch_page(page.page)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(Page {
            items: models.into_iter().map(Into::into).collect(),
            page: page.page,
            page_size: page.size,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }
}

/// Row shape for the grouped per-author count query.
#[derive(Debug, FromQueryResult)]
struct AuthorCountRow {
    author: String,
    count: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, input: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(input)
            .insert(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("duplicate") || err_str.contains("unique") {
                    RepoError::Constraint("Post already exists".to_string())
                } else {
                    RepoError::Query(err_str)
                }
            })?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        tracing::debug!(post_id = id, "Finding post by id");

        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_active(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let query = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .order_by_desc(post::Column::CreatedAt);

        self.page_query(query, page).await
    }

    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(
                Condition::any()
                    .add(post::Column::Title.contains(keyword))
                    .add(post::Column::Content.contains(keyword)),
            )
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn search(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let mut cond = Condition::all().add(post::Column::IsDeleted.eq(false));
        if let Some(title) = filter.title.as_deref() {
            cond = cond.add(post::Column::Title.contains(title));
        }
        if let Some(author) = filter.author.as_deref() {
            cond = cond.add(post::Column::Author.eq(author));
        }
        if let Some(start) = filter.start {
            cond = cond.add(post::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filter.end {
            cond = cond.add(post::Column::CreatedAt.lte(end));
        }

        let query = PostEntity::find()
            .filter(cond)
            .order_by_desc(post::Column::CreatedAt);

        self.page_query(query, page).await
    }

    async fn find_popular(
        &self,
        min_view_count: i64,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let query = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .filter(post::Column::ViewCount.gte(min_view_count))
            .order_by_desc(post::Column::ViewCount);

        self.page_query(query, page).await
    }

    async fn find_recent(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_most_viewed(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .order_by_desc(post::Column::ViewCount)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .filter(post::Column::Author.eq(author))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_recent_by_author(
        &self,
        author: &str,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .filter(post::Column::Author.eq(author))
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::CreatedAt.between(start, end))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_views_above(
        &self,
        threshold: i64,
        sorted: bool,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .filter(post::Column::ViewCount.gt(threshold));
        if sorted {
            query = query.order_by_desc(post::Column::ViewCount);
        }

        let models = query
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn increment_view_count(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let updated = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::IsDeleted.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::IsDeleted, Expr::value(true))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::IsDeleted.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn update_content(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let updated = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(patch.title))
            .col_expr(post::Column::Content, Expr::value(patch.content))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::IsDeleted.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::IsDeleted.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))
    }

    async fn count_by_author(&self) -> Result<Vec<AuthorPostCount>, RepoError> {
        let rows = PostEntity::find()
            .select_only()
            .column(post::Column::Author)
            .column_as(post::Column::Id.count(), "count")
            .filter(post::Column::IsDeleted.eq(false))
            .filter(post::Column::Author.is_not_null())
            .group_by(post::Column::Author)
            .order_by(post::Column::Id.count(), Order::Desc)
            .into_model::<AuthorCountRow>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorPostCount {
                author: row.author,
                count: row.count,
            })
            .collect())
    }
}
