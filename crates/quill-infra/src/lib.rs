//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the post storage backends.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM

pub mod database;

// Re-exports - In-Memory
pub use database::InMemoryPostRepository;

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::PostgresPostRepository;
