//! Post handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{NewPost, Page, PageRequest, Post, PostFilter, PostPatch};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    AdvancedSearchQuery, AuthorCountResponse, CountResponse, CreatePostRequest, DateRangeQuery,
    KeywordQuery, PageQuery, PageResponse, PopularQuery, PostResponse, UpdatePostRequest,
    ViewsAboveQuery,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        author: post.author,
        view_count: post.view_count,
        is_deleted: post.is_deleted,
        created_at: post.created_at.to_rfc3339(),
    }
}

fn to_page_response(page: Page<Post>) -> PageResponse<PostResponse> {
    let page = page.map(to_response);
    PageResponse {
        items: page.items,
        page: page.page,
        page_size: page.page_size,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}

fn to_responses(posts: Vec<Post>) -> Vec<PostResponse> {
    posts.into_iter().map(to_response).collect()
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Content must not be empty".to_string(),
        ));
    }

    let post = state
        .posts
        .create(NewPost {
            title: req.title,
            content: req.content,
            author: req.author,
        })
        .await?;

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// GET /api/posts/{id}
///
/// Reading an active post counts a view; the response carries the
/// post-increment count. A deleted post is returned as-is.
pub async fn get_post(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .view(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Content must not be empty".to_string(),
        ));
    }

    let post = state
        .posts
        .update(
            id,
            PostPatch {
                title: req.title,
                content: req.content,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if !state.posts.soft_delete(id).await? {
        return Err(AppError::NotFound(format!("Post {id} not found")));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Post deleted")))
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();

    let page = state.posts.list(PageRequest::new(q.page, q.size)).await?;

    Ok(HttpResponse::Ok().json(to_page_response(page)))
}

/// GET /api/posts/search
pub async fn search_posts(
    state: web::Data<AppState>,
    query: web::Query<KeywordQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.search_keyword(&query.keyword).await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/search/advanced
pub async fn search_advanced(
    state: web::Data<AppState>,
    query: web::Query<AdvancedSearchQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();

    let filter = PostFilter {
        title: q.title,
        author: q.author,
        start: q.start_date,
        end: q.end_date,
    };
    let page = state
        .posts
        .search(filter, PageRequest::new(q.page, q.size))
        .await?;

    Ok(HttpResponse::Ok().json(to_page_response(page)))
}

/// GET /api/posts/popular
pub async fn popular_posts(
    state: web::Data<AppState>,
    query: web::Query<PopularQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();

    let page = state
        .posts
        .popular(q.min_view_count, PageRequest::new(q.page, q.size))
        .await?;

    Ok(HttpResponse::Ok().json(to_page_response(page)))
}

/// GET /api/posts/recent
pub async fn recent_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.recent().await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/top-viewed
pub async fn most_viewed_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.most_viewed().await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/by-author/{author}
pub async fn posts_by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.by_author(&path).await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/by-author/{author}/recent
pub async fn recent_posts_by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.recent_by_author(&path).await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/created-between
pub async fn posts_created_between(
    state: web::Data<AppState>,
    query: web::Query<DateRangeQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.created_between(query.start, query.end).await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/views-above
pub async fn posts_views_above(
    state: web::Data<AppState>,
    query: web::Query<ViewsAboveQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .views_above(query.threshold, query.sorted)
        .await?;

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

/// GET /api/posts/stats/count
pub async fn active_post_count(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = state.posts.active_count().await?;

    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// GET /api/posts/stats/by-author
pub async fn post_counts_by_author(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let counts = state.posts.count_by_author().await?;

    let rows: Vec<AuthorCountResponse> = counts
        .into_iter()
        .map(|row| AuthorCountResponse {
            author: row.author,
            count: row.count,
        })
        .collect();

    Ok(HttpResponse::Ok().json(rows))
}
