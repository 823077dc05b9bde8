use crate::model::task::Task;
use crate::parse::parse_line;

/// Error type for task store mutations
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("no task at index {0}")]
    NotFound(usize),
    #[error("task text is empty")]
    EmptyText,
}

/// Append a task parsed from `text`. Returns the new task's index.
pub fn add_task(tasks: &mut Vec<Task>, text: &str) -> Result<usize, TaskError> {
    if text.is_empty() {
        return Err(TaskError::EmptyText);
    }
    tasks.push(parse_line(text));
    Ok(tasks.len() - 1)
}

/// Replace the task at `index` with one freshly parsed from `text`. Nothing
/// of the old task is carried over.
pub fn replace_task(tasks: &mut [Task], index: usize, text: &str) -> Result<(), TaskError> {
    if text.is_empty() {
        return Err(TaskError::EmptyText);
    }
    let slot = tasks.get_mut(index).ok_or(TaskError::NotFound(index))?;
    *slot = parse_line(text);
    Ok(())
}

/// Mark the task at `index` complete. Repeating this is harmless.
pub fn mark_done(tasks: &mut [Task], index: usize) -> Result<(), TaskError> {
    let task = tasks.get_mut(index).ok_or(TaskError::NotFound(index))?;
    task.mark_done();
    Ok(())
}

/// Remove the task at `index`, returning it
pub fn delete_task(tasks: &mut Vec<Task>, index: usize) -> Result<Task, TaskError> {
    if index >= tasks.len() {
        return Err(TaskError::NotFound(index));
    }
    Ok(tasks.remove(index))
}
