use taskflow_shared::{TaskId, ValidationError};
use thiserror::Error;

/// Failure reported by a [`crate::TaskRepository`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Errors surfaced by the task store. All of them leave the store usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("no user is signed in")]
    NotAuthenticated,

    #[error("could not sync with server: {0}")]
    Sync(#[from] RepositoryError),
}
