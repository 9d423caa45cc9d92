//! Error types for the record store's database layer
//!
//! Every failure on the way to a usable pool ends up here: bad
//! configuration, connection problems, migration failures, and query
//! errors once the pool is up.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failures from database setup and access
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Could not reach or open the database
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed after the pool was established
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Applying the embedded schema migrations failed
    #[error("Database migration error: {0}")]
    Migration(String),

    /// The connection settings themselves are unusable
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
