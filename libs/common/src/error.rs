//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every backend of the
//! trackshare service.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Postgres SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflicting record: {0}")]
    Conflict(String),

    /// The write references a record that does not exist
    #[error("Missing referenced record: {0}")]
    MissingReference(String),
}

impl DatabaseError {
    /// Classify a query error, turning unique violations into `Conflict`
    /// and foreign key violations into `MissingReference`
    pub fn from_query(err: SqlxError) -> Self {
        let violation = err.as_database_error().and_then(|db_err| {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => Some(DatabaseError::Conflict(constraint)),
                Some(FOREIGN_KEY_VIOLATION) => Some(DatabaseError::MissingReference(constraint)),
                _ => None,
            }
        });

        violation.unwrap_or(DatabaseError::Query(err))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
