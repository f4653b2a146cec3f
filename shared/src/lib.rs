use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod calendar;
pub mod clock;
pub mod insights;
pub mod progress;
pub mod request;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use insights::TaskStats;
pub use progress::progress;
pub use request::{CreatedTask, NewTask, TaskDraft, TaskEdit, TaskPatch};
pub use validation::ValidationError;

/// Server-assigned task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the authenticated user owning a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// Workflow stage of a task; one kanban column per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Doing,
    Done,
}

impl Status {
    /// Board order, left to right.
    pub const COLUMNS: [Status; 3] = [Status::Todo, Status::Doing, Status::Done];

    /// Stable identifier used for DOM ids and the wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::Doing => "Doing",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "doing" => Ok(Status::Doing),
            "done" => Ok(Status::Done),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub progress: u8,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Applies every field present in `patch`. Titles are stored trimmed,
    /// progress follows the subtask list and `updated_at` never moves
    /// backwards.
    pub fn apply(&mut self, patch: &TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(subtasks) = &patch.subtasks {
            self.subtasks = subtasks.clone();
            self.progress = progress(&self.subtasks);
        }
        self.updated_at = now.max(self.updated_at);
    }

    /// Overdue means due strictly before `today` and not yet done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != Status::Done && self.due_date < today
    }

    pub fn toggle_subtask(&self, subtask_id: &str) -> Option<TaskPatch> {
        if !self.subtasks.iter().any(|s| s.id == subtask_id) {
            return None;
        }
        let subtasks = self
            .subtasks
            .iter()
            .cloned()
            .map(|mut s| {
                if s.id == subtask_id {
                    s.completed = !s.completed;
                }
                s
            })
            .collect();
        Some(TaskPatch::new().subtasks(subtasks))
    }

    pub fn add_subtask(&self, title: &str) -> Result<TaskPatch, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptySubtaskTitle);
        }
        let mut subtasks = self.subtasks.clone();
        subtasks.push(Subtask::new(title));
        Ok(TaskPatch::new().subtasks(subtasks))
    }

    pub fn remove_subtask(&self, subtask_id: &str) -> Option<TaskPatch> {
        let before = self.subtasks.len();
        let subtasks: Vec<Subtask> = self
            .subtasks
            .iter()
            .filter(|s| s.id != subtask_id)
            .cloned()
            .collect();
        (subtasks.len() != before).then(|| TaskPatch::new().subtasks(subtasks))
    }
}

/// Orders tasks newest first, the order every task list is kept in.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
