use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry, atomic_write};
use crate::io::todo_io::{self, StoreError};
use crate::model::task::Task;

/// Days a completed task stays in the active file by default
pub const DEFAULT_THRESHOLD_DAYS: i64 = 5;

/// Completed tasks older than this drop out of the main view, archived or not
pub const DISPLAY_THRESHOLD_DAYS: i64 = 5;

/// Error type for archive passes
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("could not append to archive file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lines appended to one month's archive file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedMonth {
    /// `YYYY_MM`
    pub key: String,
    pub path: PathBuf,
    pub count: usize,
}

/// Result of a successful archive pass
#[derive(Debug, Default)]
pub struct ArchiveOutcome {
    /// Tasks that stay in the active file, in their original order
    pub remaining: Vec<Task>,
    /// Month files written, in ascending key order
    pub months: Vec<ArchivedMonth>,
}

impl ArchiveOutcome {
    pub fn archived_count(&self) -> usize {
        self.months.iter().map(|m| m.count).sum()
    }
}

/// A completed task whose completion date is at least `threshold_days`
/// before `today`. Missing or invalid completion dates are never eligible.
pub fn is_eligible(task: &Task, today: NaiveDate, threshold_days: i64) -> bool {
    if !task.completed {
        return false;
    }
    match task.completion_naive_date() {
        Some(done) => (today - done).num_days() >= threshold_days,
        None => false,
    }
}

/// Whether the task belongs in the main view. Open tasks always do;
/// completed ones disappear once they are old enough to archive.
pub fn should_display(task: &Task, today: NaiveDate) -> bool {
    !task.completed || !is_eligible(task, today, DISPLAY_THRESHOLD_DAYS)
}

/// `YYYY_MM` key for a completion date
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y_%m").to_string()
}

/// Archive file name for a month key
pub fn archive_file_name(key: &str) -> String {
    format!("todo_archive_{}.txt", key)
}

/// Move eligible tasks into per-month archive files under `archive_dir`.
///
/// Each month file is appended to (existing lines are kept) and replaced
/// atomically, so a failed month leaves its file as it was. The first failure
/// aborts the pass; files for earlier months have already been written.
pub fn archive(
    tasks: &[Task],
    archive_dir: &Path,
    today: NaiveDate,
    threshold_days: i64,
) -> Result<ArchiveOutcome, ArchiveError> {
    let mut by_month: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    let mut remaining = Vec::new();

    for task in tasks {
        match task.completion_naive_date() {
            Some(done) if is_eligible(task, today, threshold_days) => {
                by_month.entry(month_key(done)).or_default().push(task);
            }
            _ => remaining.push(task.clone()),
        }
    }

    let mut months = Vec::new();
    for (key, month_tasks) in by_month {
        let path = archive_dir.join(archive_file_name(&key));
        append_lines(&path, &month_tasks)?;
        months.push(ArchivedMonth {
            key,
            path,
            count: month_tasks.len(),
        });
    }

    Ok(ArchiveOutcome { remaining, months })
}

fn append_lines(path: &Path, tasks: &[&Task]) -> Result<(), ArchiveError> {
    let write_err = |source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut content = match std::fs::read_to_string(path) {
        Ok(existing) => existing,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(write_err(e)),
    };
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for task in tasks {
        content.push_str(&task.raw);
        content.push('\n');
    }

    atomic_write(path, content.as_bytes()).map_err(write_err)
}

/// Archive the task file at `path` in place: month files go next to it and
/// the active file is rewritten with what remains. Nothing is rewritten when
/// no task is eligible. Failures are also recorded in the recovery log.
pub fn archive_task_file(
    path: &Path,
    today: NaiveDate,
    threshold_days: i64,
) -> Result<ArchiveOutcome, ArchiveError> {
    let tasks = todo_io::load_tasks(path)?;
    let dir = todo_io::log_dir(path);

    let outcome = archive(&tasks, dir, today, threshold_days).inspect_err(|e| {
        log_archive_failure(dir, e);
    })?;
    if !outcome.months.is_empty() {
        todo_io::save_tasks(path, &outcome.remaining)?;
    }
    Ok(outcome)
}

/// Record a failed archive pass in the recovery log
pub fn log_archive_failure(dir: &Path, err: &ArchiveError) {
    recovery::log_recovery(
        dir,
        RecoveryEntry::new(RecoveryCategory::Archive, "archive pass aborted")
            .field("Error", err.to_string()),
    );
}
