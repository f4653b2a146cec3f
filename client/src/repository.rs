use async_trait::async_trait;
use taskflow_shared::{CreatedTask, NewTask, Task, TaskId, TaskPatch, UserId};

use crate::RepositoryError;

/// Remote task storage. Implementations hold no task state of their own.
///
/// Futures are not `Send`: the store runs on a single event loop (the browser
/// or a current-thread runtime).
#[async_trait(?Send)]
pub trait TaskRepository {
    /// All tasks owned by `user`.
    async fn list(&self, user: &UserId) -> Result<Vec<Task>, RepositoryError>;

    async fn create(&self, task: &NewTask) -> Result<CreatedTask, RepositoryError>;

    async fn patch(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &TaskId) -> Result<(), RepositoryError>;
}
