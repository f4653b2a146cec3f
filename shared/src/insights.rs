use chrono::Duration;
use serde::Serialize;

use crate::{Clock, Priority, Status, Task};

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub overdue: usize,
    pub completed_this_week: usize,
    pub by_priority: Vec<(Priority, usize)>,
    pub average_progress: u8,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], clock: &dyn Clock) -> Self {
        let today = clock.today();
        let week_ago = clock.now() - Duration::days(7);

        let pending = tasks.iter().filter(|t| t.status != Status::Done).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
        let completed_this_week = tasks
            .iter()
            .filter(|t| t.status == Status::Done && t.updated_at > week_ago)
            .count();
        let by_priority = Priority::ALL
            .iter()
            .map(|p| (*p, tasks.iter().filter(|t| t.priority == *p).count()))
            .collect();
        let average_progress = if tasks.is_empty() {
            0
        } else {
            let sum: usize = tasks.iter().map(|t| t.progress as usize).sum();
            ((2 * sum + tasks.len()) / (2 * tasks.len())) as u8
        };

        Self {
            total: tasks.len(),
            pending,
            overdue,
            completed_this_week,
            by_priority,
            average_progress,
        }
    }
}
