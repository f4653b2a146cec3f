use thiserror::Error;

/// Malformed input to a create or update; nothing is mutated when returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("subtask title must not be empty")]
    EmptySubtaskTitle,

    #[error("invalid due date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDueDate(String),

    #[error("unknown status: {0:?}")]
    UnknownStatus(String),

    #[error("duplicate subtask id: {0:?}")]
    DuplicateSubtaskId(String),

    #[error("update contains no fields")]
    EmptyPatch,
}
