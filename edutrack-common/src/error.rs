//! Common error types for edutrack

use thiserror::Error;

/// Common result type for edutrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across edutrack services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor is not permitted to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Write rejected by a storage-layer uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// True when the underlying sqlx error is a UNIQUE constraint violation.
///
/// The (task_id, student_id) index on task_assignments is enforced here,
/// never by pre-checking in application code.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// True when the underlying sqlx error is a FOREIGN KEY violation.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}
