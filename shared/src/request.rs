use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{progress, Priority, Status, Subtask, Task, TaskId, UserId, ValidationError};

/// Partial update of a task. Id, owner and creation time have no field here
/// and so can never change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(subtasks) = &self.subtasks {
            validate_subtasks(subtasks)?;
        }
        Ok(())
    }
}

/// Create payload sent to the remote repository. The server assigns the id
/// and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub progress: u8,
}

fn default_status() -> Status {
    Status::Todo
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        validate_subtasks(&self.subtasks)
    }

    /// Materializes the stored record once the server has assigned identity.
    pub fn into_task(self, created: CreatedTask) -> Task {
        let progress = progress(&self.subtasks);
        Task {
            id: created.id,
            user_id: self.user_id,
            title: self.title.trim().to_string(),
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
            subtasks: self.subtasks,
            progress,
            created_at: created.created_at,
            updated_at: created.updated_at.max(created.created_at),
        }
    }
}

/// Identity assigned by the server to a newly created task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    pub id: TaskId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Raw input of the "new task" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub subtask_titles: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date: due_date.into(),
            priority: Priority::Medium,
            subtask_titles: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn subtask_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtask_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Splits the comma separated checklist field of the form.
    pub fn subtasks_csv(self, csv: &str) -> Self {
        self.subtask_titles(csv.split(','))
    }

    /// Validates the draft and builds the create payload. New tasks start in
    /// `Todo` with fresh, incomplete subtasks; blank subtask titles are dropped.
    pub fn into_new_task(self, owner: UserId) -> Result<NewTask, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let due_date = parse_due_date(&self.due_date)?;
        let subtasks: Vec<Subtask> = self
            .subtask_titles
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(Subtask::new)
            .collect();
        Ok(NewTask {
            user_id: owner,
            title: title.to_string(),
            description: self.description,
            due_date,
            priority: self.priority,
            status: Status::Todo,
            progress: progress(&subtasks),
            subtasks,
        })
    }
}

/// Field values of the edit dialog for one existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub status: Status,
}

impl TaskEdit {
    pub fn of(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.format("%Y-%m-%d").to_string(),
            priority: task.priority,
            status: task.status,
        }
    }

    /// Patch carrying only the fields that differ from `task`, or `None`
    /// when the dialog was saved unchanged.
    pub fn diff(&self, task: &Task) -> Result<Option<TaskPatch>, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let due_date = parse_due_date(&self.due_date)?;

        let mut patch = TaskPatch::new();
        if title != task.title {
            patch = patch.title(title);
        }
        if self.description != task.description {
            patch = patch.description(self.description.clone());
        }
        if due_date != task.due_date {
            patch = patch.due_date(due_date);
        }
        if self.priority != task.priority {
            patch = patch.priority(self.priority);
        }
        if self.status != task.status {
            patch = patch.status(self.status);
        }
        Ok((!patch.is_empty()).then_some(patch))
    }
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDueDate(raw.to_string()))
}

fn validate_subtasks(subtasks: &[Subtask]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(subtasks.len());
    for subtask in subtasks {
        if subtask.title.trim().is_empty() {
            return Err(ValidationError::EmptySubtaskTitle);
        }
        if !seen.insert(subtask.id.as_str()) {
            return Err(ValidationError::DuplicateSubtaskId(subtask.id.clone()));
        }
    }
    Ok(())
}
