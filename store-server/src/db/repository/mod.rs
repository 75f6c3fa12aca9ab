//! Repository Module
//!
//! CRUD and guarded state transitions over SQLite. Every cross-request
//! invariant (pay-once, book-once, forward-only status) is enforced here
//! with single-statement conditional UPDATEs, never read-modify-write.

pub mod order;
pub mod store_config;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Whether an sqlx error is a UNIQUE-constraint violation on the given column.
///
/// SQLite reports these as "UNIQUE constraint failed: table.column".
pub(crate) fn is_unique_violation(err: &sqlx::Error, column: &str) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("unique") && msg.contains(&column.to_lowercase())
}
