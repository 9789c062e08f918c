//! Domain-level error types.
//!
//! Expected absence (unknown id, deleted record) is never an error here;
//! operations return `Option` or `bool` for it. `RepoError` covers the
//! unexpected store failures that abort a single request.

use thiserror::Error;

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
