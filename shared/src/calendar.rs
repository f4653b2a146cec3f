//! Month agenda: tasks grouped by due date.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::Task;

/// Tasks due within `year`-`month`, keyed by due date in ascending order.
/// Within a day, tasks keep the order they had in `tasks`.
pub fn agenda(tasks: &[Task], year: i32, month: u32) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks
        .iter()
        .filter(|t| t.due_date.year() == year && t.due_date.month() == month)
    {
        days.entry(task.due_date).or_default().push(task);
    }
    days
}
