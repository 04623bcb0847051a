//! Database error types

use gamesales_types::GameSalesError;
use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored value the domain model does not recognise
    #[error("Unexpected column value: {0}")]
    Decode(String),

    #[error("Change feed error: {0}")]
    Feed(String),
}

impl DbError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DbError::NotFound(format!("{} {}", entity, id))
    }

    pub(crate) fn decode(column: &str, value: &str) -> Self {
        DbError::Decode(format!("{} = '{}'", column, value))
    }
}

impl From<GameSalesError> for DbError {
    fn from(e: GameSalesError) -> Self {
        match e {
            GameSalesError::InvalidInput { .. } => DbError::InvalidInput(e.to_string()),
            GameSalesError::NotFound { .. } => DbError::NotFound(e.to_string()),
            GameSalesError::Conflict { .. } => DbError::Conflict(e.to_string()),
            other => DbError::InvalidInput(other.to_string()),
        }
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
