//! Drag-and-drop between the three kanban columns.
//!
//! While a card is dragged, the column it hovers over only changes how the
//! board is drawn. The status change is committed through
//! [`TaskStore::update`] on release, and only when the card ends up in a
//! different valid column. A failed commit is rolled back by the store.

use taskflow_shared::{Status, Task, TaskId, TaskPatch};
use tracing::debug;

use crate::{PendingSync, StoreError, TaskRepository, TaskStore};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: TaskId,
        origin: Status,
        /// Column under the pointer; `None` when outside every column.
        over: Option<Status>,
    },
}

/// Result of releasing a dragged card.
pub enum DropOutcome {
    /// Status change applied locally; the future sends it to the server.
    Committed(PendingSync),
    /// Released over the column it started in.
    Unchanged,
    /// Released outside any column; the card goes back to its origin.
    Reverted,
    /// Nothing was being dragged.
    Ignored,
}

/// One rendered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone, Default)]
pub struct KanbanDrag {
    state: DragState,
}

impl KanbanDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Dragging { task_id, .. } => Some(task_id),
            DragState::Idle => None,
        }
    }

    /// Picks up a card. Ids the store does not know are ignored and `false`
    /// is returned.
    pub fn start<R: TaskRepository + 'static>(
        &mut self,
        store: &TaskStore<R>,
        task_id: &TaskId,
    ) -> bool {
        let Some(task) = store.task(task_id) else {
            debug!(%task_id, "drag start ignored, unknown task");
            return false;
        };
        self.state = DragState::Dragging {
            task_id: task.id,
            origin: task.status,
            over: Some(task.status),
        };
        true
    }

    pub fn hover(&mut self, column: Option<Status>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = column;
        }
    }

    /// Hover by drop-target id as reported by the view. Anything that is not
    /// a column id counts as "outside the board".
    pub fn hover_target(&mut self, target_id: &str) {
        self.hover(target_id.parse().ok());
    }

    /// Abandons the drag; the card returns to its origin column.
    pub fn cancel(&mut self) {
        if let DragState::Dragging { task_id, .. } = &self.state {
            debug!(%task_id, "drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// Releases the card over the currently hovered column.
    pub fn release<R: TaskRepository + 'static>(
        &mut self,
        store: &TaskStore<R>,
    ) -> Result<DropOutcome, StoreError> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => Ok(DropOutcome::Ignored),
            DragState::Dragging { over: None, task_id, .. } => {
                debug!(%task_id, "dropped outside the board");
                Ok(DropOutcome::Reverted)
            }
            DragState::Dragging {
                over: Some(column),
                origin,
                ..
            } if column == origin => Ok(DropOutcome::Unchanged),
            DragState::Dragging {
                task_id,
                over: Some(column),
                ..
            } => {
                debug!(%task_id, %column, "moving card");
                store
                    .update(&task_id, TaskPatch::new().status(column))
                    .map(DropOutcome::Committed)
            }
        }
    }

    /// Column a task is drawn in: the hovered column for the dragged card,
    /// its stored status for everything else.
    pub fn display_status(&self, task: &Task) -> Status {
        match &self.state {
            DragState::Dragging {
                task_id,
                origin,
                over,
            } if task_id == &task.id => over.unwrap_or(*origin),
            _ => task.status,
        }
    }

    /// Splits `tasks` into board columns, preserving list order inside each.
    pub fn columns<'a>(&self, tasks: &'a [Task]) -> Vec<Column<'a>> {
        Status::COLUMNS
            .iter()
            .map(|&status| Column {
                status,
                tasks: tasks
                    .iter()
                    .filter(|t| self.display_status(t) == status)
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use taskflow_shared::{Priority, UserId};

    fn card(id: &str, status: Status) -> Task {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        Task {
            id: TaskId::new(id),
            user_id: UserId::new("u1"),
            title: id.to_string(),
            description: String::new(),
            due_date: at.date_naive(),
            priority: Priority::Low,
            status,
            subtasks: Vec::new(),
            progress: 0,
            created_at: at,
            updated_at: at,
        }
    }

    fn dragging(id: &str, origin: Status, over: Option<Status>) -> KanbanDrag {
        KanbanDrag {
            state: DragState::Dragging {
                task_id: TaskId::new(id),
                origin,
                over,
            },
        }
    }

    fn ids(column: &Column<'_>) -> Vec<String> {
        column.tasks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn idle_board_groups_by_status() {
        let tasks = vec![
            card("a", Status::Todo),
            card("b", Status::Done),
            card("c", Status::Todo),
        ];
        let columns = KanbanDrag::new().columns(&tasks);
        assert_eq!(columns.len(), 3);
        assert_eq!(ids(&columns[0]), vec!["a", "c"]);
        assert!(columns[1].tasks.is_empty());
        assert_eq!(ids(&columns[2]), vec!["b"]);
    }

    #[test]
    fn hovered_card_is_drawn_in_hovered_column() {
        let tasks = vec![card("a", Status::Todo), card("b", Status::Todo)];
        let drag = dragging("a", Status::Todo, Some(Status::Doing));
        let columns = drag.columns(&tasks);
        assert_eq!(ids(&columns[0]), vec!["b"]);
        assert_eq!(ids(&columns[1]), vec!["a"]);
        assert_eq!(tasks[0].status, Status::Todo);
    }

    #[test]
    fn card_outside_the_board_is_drawn_at_origin() {
        let tasks = vec![card("a", Status::Doing)];
        let drag = dragging("a", Status::Doing, None);
        assert_eq!(drag.display_status(&tasks[0]), Status::Doing);
    }

    #[test]
    fn hover_target_parses_column_ids() {
        let mut drag = dragging("a", Status::Todo, Some(Status::Todo));
        drag.hover_target("done");
        assert_eq!(
            drag.state(),
            &DragState::Dragging {
                task_id: TaskId::new("a"),
                origin: Status::Todo,
                over: Some(Status::Done),
            }
        );
        drag.hover_target("trash");
        assert!(matches!(drag.state(), DragState::Dragging { over: None, .. }));
    }

    #[test]
    fn hover_and_cancel_while_idle_are_no_ops() {
        let mut drag = KanbanDrag::new();
        drag.hover(Some(Status::Done));
        drag.cancel();
        assert_eq!(drag.state(), &DragState::Idle);
        assert!(drag.dragged().is_none());
    }
}
