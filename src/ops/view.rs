use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::task::Task;
use crate::ops::archive::should_display;

/// Bucket for tasks without any `@label`
pub const NO_CONTEXT: &str = "No Context";

/// One display group: every task carrying `label`, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    /// Indices into the task store
    pub entries: Vec<usize>,
}

/// Group tasks by label. Unlabeled tasks go to the leading "No Context"
/// bucket; a task with several labels appears in each of their buckets.
pub fn group(tasks: &[Task]) -> Vec<Bucket> {
    group_where(tasks, |_| true)
}

/// Group only the tasks that belong in the main view on `today`: blank lines
/// and completed tasks past the display threshold are left out.
pub fn group_visible(tasks: &[Task], today: NaiveDate) -> Vec<Bucket> {
    group_where(tasks, |t| !t.is_blank() && should_display(t, today))
}

/// Group every non-blank task, old completed ones included
pub fn group_nonblank(tasks: &[Task]) -> Vec<Bucket> {
    group_where(tasks, |t| !t.is_blank())
}

fn group_where(tasks: &[Task], keep: impl Fn(&Task) -> bool) -> Vec<Bucket> {
    let mut untagged = Vec::new();
    let mut labeled: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (idx, task) in tasks.iter().enumerate() {
        if !keep(task) {
            continue;
        }
        if task.labels.is_empty() {
            untagged.push(idx);
        }
        for label in &task.labels {
            let entries = labeled.entry(label.as_str()).or_default();
            // A label repeated on one line still lists the task once
            if entries.last() != Some(&idx) {
                entries.push(idx);
            }
        }
    }

    let mut buckets = Vec::with_capacity(labeled.len() + 1);
    if !untagged.is_empty() {
        buckets.push(Bucket {
            label: NO_CONTEXT.to_string(),
            entries: untagged,
        });
    }
    for (label, entries) in labeled {
        buckets.push(Bucket {
            label: label.to_string(),
            entries,
        });
    }

    for bucket in &mut buckets {
        // sort_by_key is stable, so equal keys keep file order
        bucket
            .entries
            .sort_by_key(|&i| (tasks[i].completed, tasks[i].priority_rank()));
    }
    buckets
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Position in the grouped view: bucket, then entry within that bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub bucket: usize,
    pub entry: usize,
}

impl Cursor {
    pub fn new(bucket: usize, entry: usize) -> Self {
        Cursor { bucket, entry }
    }

    /// Next entry, continuing into the next bucket. Stops at the last entry.
    pub fn down(self, buckets: &[Bucket]) -> Cursor {
        let c = self.clamp(buckets);
        let Some(bucket) = buckets.get(c.bucket) else {
            return c;
        };
        if c.entry + 1 < bucket.entries.len() {
            Cursor::new(c.bucket, c.entry + 1)
        } else if c.bucket + 1 < buckets.len() {
            Cursor::new(c.bucket + 1, 0)
        } else {
            c
        }
    }

    /// Previous entry, continuing into the end of the previous bucket.
    /// Stops at the first entry.
    pub fn up(self, buckets: &[Bucket]) -> Cursor {
        let c = self.clamp(buckets);
        if c.entry > 0 {
            Cursor::new(c.bucket, c.entry - 1)
        } else if c.bucket > 0 {
            let prev = c.bucket - 1;
            Cursor::new(prev, buckets[prev].entries.len().saturating_sub(1))
        } else {
            c
        }
    }

    /// First entry of the next bucket
    pub fn next_bucket(self, buckets: &[Bucket]) -> Cursor {
        let c = self.clamp(buckets);
        if c.bucket + 1 < buckets.len() {
            Cursor::new(c.bucket + 1, 0)
        } else {
            c
        }
    }

    /// First entry of the previous bucket
    pub fn prev_bucket(self, buckets: &[Bucket]) -> Cursor {
        let c = self.clamp(buckets);
        if c.bucket > 0 {
            Cursor::new(c.bucket - 1, 0)
        } else {
            c
        }
    }

    pub fn first() -> Cursor {
        Cursor::default()
    }

    pub fn last(buckets: &[Bucket]) -> Cursor {
        match buckets.last() {
            Some(b) => Cursor::new(buckets.len() - 1, b.entries.len().saturating_sub(1)),
            None => Cursor::default(),
        }
    }

    /// Pull both indices back into range. An empty view clamps to (0, 0).
    pub fn clamp(self, buckets: &[Bucket]) -> Cursor {
        if buckets.is_empty() {
            return Cursor::default();
        }
        let bucket = self.bucket.min(buckets.len() - 1);
        let len = buckets[bucket].entries.len();
        Cursor::new(bucket, self.entry.min(len.saturating_sub(1)))
    }
}

/// Task store index under the cursor, if the cursor points at an entry
pub fn task_at(buckets: &[Bucket], cursor: Cursor) -> Option<usize> {
    buckets
        .get(cursor.bucket)
        .and_then(|b| b.entries.get(cursor.entry))
        .copied()
}

/// First place a task appears in the view
pub fn position_of(buckets: &[Bucket], index: usize) -> Option<Cursor> {
    buckets.iter().enumerate().find_map(|(b, bucket)| {
        bucket
            .entries
            .iter()
            .position(|&i| i == index)
            .map(|e| Cursor::new(b, e))
    })
}

/// Row of the cursor in the flattened view, counting one header row per
/// bucket. Used to keep the cursor on screen.
pub fn flat_row(buckets: &[Bucket], cursor: Cursor) -> usize {
    let before: usize = buckets
        .iter()
        .take(cursor.bucket)
        .map(|b| b.entries.len() + 1)
        .sum();
    before + 1 + cursor.entry
}

/// Total rows in the flattened view
pub fn row_count(buckets: &[Bucket]) -> usize {
    buckets.iter().map(|b| b.entries.len() + 1).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;

    fn tasks(lines: &[&str]) -> Vec<Task> {
        lines.iter().map(|l| parse_line(l)).collect()
    }

    fn labels(buckets: &[Bucket]) -> Vec<&str> {
        buckets.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_no_context_first_then_labels_sorted() {
        let t = tasks(&["(C) report @Work", "(A) review @Work", "plain"]);
        let buckets = group(&t);
        assert_eq!(labels(&buckets), vec![NO_CONTEXT, "Work"]);
        assert_eq!(buckets[0].entries, vec![2]);
        // A before C
        assert_eq!(buckets[1].entries, vec![1, 0]);
    }

    #[test]
    fn test_fan_out_across_labels() {
        let t = tasks(&["call @phone @errands", "buy milk @errands", "@zeta one"]);
        let buckets = group(&t);
        assert_eq!(labels(&buckets), vec!["errands", "phone", "zeta"]);
        assert_eq!(buckets[0].entries, vec![0, 1]);
        assert_eq!(buckets[1].entries, vec![0]);
    }

    #[test]
    fn test_no_context_omitted_when_empty() {
        let buckets = group(&tasks(&["a @x"]));
        assert_eq!(labels(&buckets), vec!["x"]);
    }

    #[test]
    fn test_lone_at_sign_gets_empty_label_bucket() {
        let buckets = group(&tasks(&["meet @ noon", "plain"]));
        assert_eq!(labels(&buckets), vec![NO_CONTEXT, ""]);
        assert_eq!(buckets[1].entries, vec![0]);
    }

    #[test]
    fn test_repeated_label_listed_once() {
        let buckets = group(&tasks(&["twice @x @x"]));
        assert_eq!(buckets[0].entries, vec![0]);
    }

    #[test]
    fn test_incomplete_before_completed_then_priority() {
        let t = tasks(&[
            "x (A) done but was A",
            "no priority",
            "x 2025-09-01 done plain",
            "(Z) last letter",
            "(B) middle",
            "pri:A via token",
        ]);
        let order: Vec<usize> = group(&t)[0].entries.clone();
        // open: A(5), B(4), Z(3), none(1); then completed in file order
        assert_eq!(order, vec![5, 4, 3, 1, 0, 2]);
    }

    #[test]
    fn test_equal_keys_keep_file_order() {
        let t = tasks(&["(B) one", "(B) two", "(B) three"]);
        assert_eq!(group(&t)[0].entries, vec![0, 1, 2]);
    }

    #[test]
    fn test_group_visible_hides_old_completed_and_blank() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let t = tasks(&[
            "x 2025-09-01 long done",
            "",
            "x 2025-09-30 just done",
            "open",
        ]);
        let buckets = group_visible(&t, today);
        assert_eq!(buckets[0].entries, vec![3, 2]);
        assert_eq!(group(&t)[0].entries.len(), 4);
        assert_eq!(group_nonblank(&t)[0].entries, vec![3, 0, 2]);
    }

    #[test]
    fn test_cursor_crosses_bucket_boundaries() {
        let t = tasks(&["a", "b", "c @x", "d @y"]);
        let buckets = group(&t);
        let c = Cursor::new(0, 1);
        assert_eq!(c.down(&buckets), Cursor::new(1, 0));
        assert_eq!(Cursor::new(1, 0).up(&buckets), Cursor::new(0, 1));
        assert_eq!(Cursor::new(2, 0).up(&buckets), Cursor::new(1, 0));
    }

    #[test]
    fn test_cursor_clamps_at_ends() {
        let buckets = group(&tasks(&["a", "b @x"]));
        assert_eq!(Cursor::first().up(&buckets), Cursor::first());
        let last = Cursor::last(&buckets);
        assert_eq!(last, Cursor::new(1, 0));
        assert_eq!(last.down(&buckets), last);
        assert_eq!(last.next_bucket(&buckets), last);
        assert_eq!(Cursor::first().prev_bucket(&buckets), Cursor::first());
    }

    #[test]
    fn test_bucket_jumps() {
        let buckets = group(&tasks(&["a", "b", "c @x", "d @y"]));
        assert_eq!(Cursor::new(0, 1).next_bucket(&buckets), Cursor::new(1, 0));
        assert_eq!(Cursor::new(2, 0).prev_bucket(&buckets), Cursor::new(1, 0));
    }

    #[test]
    fn test_clamp_after_shrink() {
        let buckets = group(&tasks(&["a", "b"]));
        assert_eq!(Cursor::new(3, 7).clamp(&buckets), Cursor::new(0, 1));
        assert_eq!(Cursor::new(3, 7).clamp(&[]), Cursor::new(0, 0));
    }

    #[test]
    fn test_clamp_after_deleting_last_entry() {
        let mut t = tasks(&["a", "b", "c"]);
        let buckets = group(&t);
        let cursor = Cursor::new(0, 2);
        assert_eq!(task_at(&buckets, cursor), Some(2));

        t.remove(2);
        let rebuilt = group(&t);
        let cursor = cursor.clamp(&rebuilt);
        assert_eq!(cursor, Cursor::new(0, 1));
        assert_eq!(task_at(&rebuilt, cursor), Some(1));
    }

    #[test]
    fn test_movement_on_empty_view() {
        let empty: Vec<Bucket> = Vec::new();
        let c = Cursor::first();
        assert_eq!(c.down(&empty), c);
        assert_eq!(c.up(&empty), c);
        assert_eq!(Cursor::last(&empty), c);
        assert_eq!(task_at(&empty, c), None);
    }

    #[test]
    fn test_position_of_finds_first_occurrence() {
        let buckets = group(&tasks(&["a", "b @x @y"]));
        assert_eq!(position_of(&buckets, 1), Some(Cursor::new(1, 0)));
        assert_eq!(position_of(&buckets, 9), None);
    }

    #[test]
    fn test_flat_rows() {
        let buckets = group(&tasks(&["a", "b", "c @x"]));
        assert_eq!(flat_row(&buckets, Cursor::new(0, 0)), 1);
        assert_eq!(flat_row(&buckets, Cursor::new(1, 0)), 4);
        assert_eq!(row_count(&buckets), 5);
    }
}
