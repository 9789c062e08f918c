//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::PostRepository;
use quill_core::service::PostService;
use quill_infra::database::{DatabaseConfig, InMemoryPostRepository};

#[cfg(feature = "postgres")]
use quill_infra::database::{self, PostgresPostRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    /// Storage backend selected at startup, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with the appropriate store implementation.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let (repo, storage): (Arc<dyn PostRepository>, &'static str) = {
            if let Some(config) = db_config {
                match database::connect(config).await {
                    Ok(db) => (Arc::new(PostgresPostRepository::new(db)), "postgres"),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        (Arc::new(InMemoryPostRepository::new()), "memory")
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (Arc::new(InMemoryPostRepository::new()), "memory")
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (repo, storage): (Arc<dyn PostRepository>, &'static str) = {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
            }
            tracing::info!("Running without postgres feature - using in-memory repository");
            (Arc::new(InMemoryPostRepository::new()), "memory")
        };

        tracing::info!("Application state initialized");

        Self {
            posts: PostService::new(repo),
            storage,
        }
    }
}
