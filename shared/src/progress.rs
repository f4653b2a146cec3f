use crate::Subtask;

/// Completion percentage of a subtask checklist, rounded half up.
///
/// An empty checklist is 0% done.
pub fn progress(subtasks: &[Subtask]) -> u8 {
    let total = subtasks.len();
    if total == 0 {
        return 0;
    }
    let completed = subtasks.iter().filter(|s| s.completed).count();
    // round(100k/n) == floor((200k + n) / 2n) for non-negative k, n
    ((200 * completed + total) / (2 * total)) as u8
}
