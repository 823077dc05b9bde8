use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::task::Task;
use crate::parse::{parse_lines, serialize_tasks};

/// Error type for task file I/O
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read every line of a file. A trailing newline does not produce an extra
/// empty line, but blank lines inside the file are kept.
pub fn read_all_lines(path: &Path) -> Result<Vec<String>, StoreError> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(split_lines(&content))
}

fn split_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Replace the whole file with `lines`, each terminated by a newline.
pub fn write_all_lines(path: &Path, lines: &[String]) -> Result<(), StoreError> {
    let content = join_lines(lines);
    recovery::atomic_write(path, content.as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn join_lines(lines: &[String]) -> String {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// Load the task store from the active file
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, StoreError> {
    let lines = read_all_lines(path)?;
    Ok(parse_lines(&lines))
}

/// Load the task store, falling back to an empty store when the file is
/// missing or unreadable. The caller gets the error back for display.
pub fn load_tasks_or_empty(path: &Path) -> (Vec<Task>, Option<StoreError>) {
    match load_tasks(path) {
        Ok(tasks) => (tasks, None),
        Err(StoreError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            (Vec::new(), None)
        }
        Err(e) => (Vec::new(), Some(e)),
    }
}

/// Save the task store back to the active file.
///
/// On failure the content that could not be written goes to the recovery
/// log next to the file, and the error is returned.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), StoreError> {
    let lines = serialize_tasks(tasks);
    if let Err(e) = write_all_lines(path, &lines) {
        recovery::log_recovery(
            log_dir(path),
            RecoveryEntry::new(RecoveryCategory::Write, "task file write failed")
                .field("Target", path.display().to_string())
                .field("Error", e.to_string())
                .body(join_lines(&lines)),
        );
        return Err(e);
    }
    Ok(())
}

/// Directory that holds the task file (and its archive and recovery files)
pub fn log_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::parse::parse_line;
    use tempfile::TempDir;

    #[test]
    fn test_split_lines() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a"), vec!["a"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("todo.txt");
        let content = "(A) 2025-09-26 Finish report @Work\n\nx 2025-09-20 Setup +DevOps\n\n";
        fs::write(&path, content).unwrap();

        let tasks = load_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 4);
        assert!(tasks[1].is_blank());
        assert!(tasks[3].is_blank());

        save_tasks(&path, &tasks).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("todo.txt");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();
        save_tasks(&path, &[parse_line("only")]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "only\n");
    }

    #[test]
    fn test_missing_file_loads_empty_without_error() {
        let tmp = TempDir::new().unwrap();
        let (tasks, err) = load_tasks_or_empty(&tmp.path().join("missing.txt"));
        assert!(tasks.is_empty());
        assert!(err.is_none());
    }

    #[test]
    fn test_unreadable_file_loads_empty_with_error() {
        let tmp = TempDir::new().unwrap();
        // A directory cannot be read as a file
        let (tasks, err) = load_tasks_or_empty(tmp.path());
        assert!(tasks.is_empty());
        assert!(matches!(err, Some(StoreError::ReadError { .. })));
    }

    #[test]
    fn test_failed_save_goes_to_recovery_log() {
        let tmp = TempDir::new().unwrap();
        // The target is an existing directory, so the rename fails
        let path = tmp.path().join("blocked");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        let err = save_tasks(&path, &[parse_line("(A) precious")]).unwrap_err();
        assert!(matches!(err, StoreError::WriteError { .. }));

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "(A) precious");
    }

    #[test]
    fn test_log_dir_of_bare_file_name() {
        assert_eq!(log_dir(Path::new("todo.txt")), Path::new("."));
        assert_eq!(log_dir(Path::new("/a/b/todo.txt")), Path::new("/a/b"));
    }
}
