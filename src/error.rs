//! Error types for sqlbook.

use thiserror::Error;

/// The main error type for sqlbook operations.
#[derive(Debug, Error)]
pub enum SqlbookError {
    /// A query header declared a name that is not a valid identifier.
    #[error("Invalid query name: '{0}'")]
    InvalidQueryName(String),

    /// `execute` was called on an executor that holds no adapter.
    #[error("Missing adapter, call Executor::register_adapter first")]
    AdapterNotRegistered,

    /// Storage failure surfaced by an adapter.
    #[error("Database error: {0}")]
    Database(String),
}

impl SqlbookError {
    /// Create a database error from any displayable failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

/// Result type alias for sqlbook operations.
pub type SqlbookResult<T> = Result<T, SqlbookError>;
