//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
///
/// Literal paths are registered before the `{id}` routes so that e.g.
/// `/posts/search` never resolves as a post id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/search", web::get().to(posts::search_posts))
                    .route("/search/advanced", web::get().to(posts::search_advanced))
                    .route("/popular", web::get().to(posts::popular_posts))
                    .route("/recent", web::get().to(posts::recent_posts))
                    .route("/top-viewed", web::get().to(posts::most_viewed_posts))
                    .route("/created-between", web::get().to(posts::posts_created_between))
                    .route("/views-above", web::get().to(posts::posts_views_above))
                    .route("/stats/count", web::get().to(posts::active_post_count))
                    .route("/stats/by-author", web::get().to(posts::post_counts_by_author))
                    .route("/by-author/{author}", web::get().to(posts::posts_by_author))
                    .route(
                        "/by-author/{author}/recent",
                        web::get().to(posts::recent_posts_by_author),
                    )
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}
