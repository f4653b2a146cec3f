use std::collections::HashMap;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use taskflow_shared::{sort_newest_first, Task, TaskId, UserId};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::ApiError;

/// Persistence behind the task routes. Tasks are stored whole; patches are
/// applied by the route before writing.
#[async_trait]
pub trait TaskStorage: Send + Sync {
    /// Tasks owned by `user`, newest first.
    async fn list(&self, user: &UserId) -> Result<Vec<Task>, ApiError>;

    async fn get(&self, id: &TaskId) -> Result<Option<Task>, ApiError>;

    /// Inserts or replaces.
    async fn put(&self, task: &Task) -> Result<(), ApiError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: &TaskId) -> Result<bool, ApiError>;
}

/// `task:{id}` holds the task JSON, `user:{id}:tasks` the set of a user's
/// task ids.
pub struct RedisStorage {
    client: Client,
}

impl RedisStorage {
    pub fn open(url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::open(url)?,
        })
    }

    fn task_key(id: &TaskId) -> String {
        format!("task:{}", id)
    }

    fn user_key(user: &UserId) -> String {
        format!("user:{}:tasks", user)
    }
}

#[async_trait]
impl TaskStorage for RedisStorage {
    async fn list(&self, user: &UserId) -> Result<Vec<Task>, ApiError> {
        let mut conn = self.client.get_async_connection().await?;
        let ids: Vec<String> = conn.smembers(Self::user_key(user)).await?;

        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            let id = TaskId::new(id);
            let task_json: Option<String> = conn.get(Self::task_key(&id)).await?;
            match task_json {
                Some(json) => tasks.push(serde_json::from_str::<Task>(&json)?),
                None => warn!(%id, %user, "task index points at a missing record"),
            }
        }
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>, ApiError> {
        let mut conn = self.client.get_async_connection().await?;
        let task_json: Option<String> = conn.get(Self::task_key(id)).await?;
        match task_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, task: &Task) -> Result<(), ApiError> {
        let task_json = serde_json::to_string(task)?;
        let mut conn = self.client.get_async_connection().await?;
        let _: () = conn.set(Self::task_key(&task.id), task_json).await?;
        let _: () = conn
            .sadd(Self::user_key(&task.user_id), task.id.as_str())
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, ApiError> {
        let Some(task) = self.get(id).await? else {
            return Ok(false);
        };
        let mut conn = self.client.get_async_connection().await?;
        let _: () = conn
            .srem(Self::user_key(&task.user_id), id.as_str())
            .await?;
        let deleted: usize = conn.del(Self::task_key(id)).await?;
        Ok(deleted > 0)
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    tasks: Mutex<HashMap<TaskId, Task>>,
}

#[async_trait]
impl TaskStorage for MemoryStorage {
    async fn list(&self, user: &UserId) -> Result<Vec<Task>, ApiError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .await
            .values()
            .filter(|t| &t.user_id == user)
            .cloned()
            .collect();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>, ApiError> {
        Ok(self.tasks.lock().await.get(id).cloned())
    }

    async fn put(&self, task: &Task) -> Result<(), ApiError> {
        self.tasks
            .lock()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, ApiError> {
        Ok(self.tasks.lock().await.remove(id).is_some())
    }
}
