use thiserror::Error;

use super::todo::TodoId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("todo with id {0} does not exist")]
    NotFound(TodoId),
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
