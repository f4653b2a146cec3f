#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use taskflow_client::model::{
    progress, sort_newest_first, CreatedTask, FixedClock, NewTask, Priority, Status, Subtask, Task,
    TaskId, TaskPatch, UserId,
};
use taskflow_client::{RepositoryError, TaskRepository, TaskStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(UserId),
    Create(String),
    Patch(TaskId, TaskPatch),
    Delete(TaskId),
}

/// Scripted in-memory repository. Each remote call pops the next scripted
/// outcome; an empty script means success.
#[derive(Default)]
pub struct ScriptedRepository {
    tasks: RefCell<Vec<Task>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<VecDeque<bool>>,
    next_id: Cell<u32>,
}

impl ScriptedRepository {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let repo = Self::default();
        *repo.tasks.borrow_mut() = tasks;
        repo
    }

    pub fn fail_next(&self) {
        self.failures.borrow_mut().push_back(true);
    }

    pub fn succeed_next(&self) {
        self.failures.borrow_mut().push_back(false);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutation_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .collect()
    }

    pub fn stored(&self, id: &str) -> Option<Task> {
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id.as_str() == id)
            .cloned()
    }

    fn settle(&self, call: Call) -> Result<(), RepositoryError> {
        self.calls.borrow_mut().push(call);
        if self.failures.borrow_mut().pop_front().unwrap_or(false) {
            return Err(RepositoryError::Rejected {
                status: 500,
                message: "backend unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl TaskRepository for ScriptedRepository {
    async fn list(&self, user: &UserId) -> Result<Vec<Task>, RepositoryError> {
        self.settle(Call::List(user.clone()))?;
        let mut tasks: Vec<Task> = self
            .tasks
            .borrow()
            .iter()
            .filter(|t| &t.user_id == user)
            .cloned()
            .collect();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn create(&self, task: &NewTask) -> Result<CreatedTask, RepositoryError> {
        self.settle(Call::Create(task.title.clone()))?;
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let at = base_time() + Duration::days(30 + n as i64);
        let created = CreatedTask {
            id: TaskId::new(format!("new-{n}")),
            created_at: at,
            updated_at: at,
        };
        self.tasks
            .borrow_mut()
            .push(task.clone().into_task(created.clone()));
        Ok(created)
    }

    async fn patch(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), RepositoryError> {
        self.settle(Call::Patch(id.clone(), patch.clone()))?;
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RepositoryError::Rejected {
                status: 404,
                message: format!("no task {id}"),
            })?;
        task.apply(patch, now());
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RepositoryError> {
        self.settle(Call::Delete(id.clone()))?;
        self.tasks.borrow_mut().retain(|t| &t.id != id);
        Ok(())
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

pub fn user() -> UserId {
    UserId::new("user-1")
}

/// A task created `age_days` after the base time, so larger is newer.
pub fn task(id: &str, age_days: i64, status: Status) -> Task {
    let created = base_time() + Duration::days(age_days);
    Task {
        id: TaskId::new(id),
        user_id: user(),
        title: format!("Task {id}"),
        description: String::new(),
        due_date: "2026-10-25".parse().unwrap(),
        priority: Priority::Medium,
        status,
        subtasks: Vec::new(),
        progress: 0,
        created_at: created,
        updated_at: created,
    }
}

pub fn with_checklist(mut task: Task, completed: &[bool]) -> Task {
    task.subtasks = completed
        .iter()
        .enumerate()
        .map(|(i, done)| Subtask {
            id: format!("{}-s{i}", task.id),
            title: format!("step {i}"),
            completed: *done,
        })
        .collect();
    task.progress = progress(&task.subtasks);
    task
}

/// Store signed in as [`user`] and loaded from `tasks`.
pub async fn loaded_store(tasks: Vec<Task>) -> TaskStore<ScriptedRepository> {
    let store = TaskStore::with_clock(ScriptedRepository::with_tasks(tasks), FixedClock(now()));
    store
        .set_user(Some(user()))
        .await
        .expect("initial load");
    store
}

pub fn ids(store: &TaskStore<ScriptedRepository>) -> Vec<String> {
    store.tasks().iter().map(|t| t.id.to_string()).collect()
}
