use crate::model::task::Task;

/// Serialize a task back to its line.
///
/// The raw text is the canonical form: edits replace the whole task with a
/// freshly parsed one, so there is no field-to-text assembly step.
pub fn serialize_line(task: &Task) -> &str {
    &task.raw
}

/// Serialize the whole task store, one line per task
pub fn serialize_tasks(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| serialize_line(t).to_string()).collect()
}
