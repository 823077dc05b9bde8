use std::collections::BTreeMap;

use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::Task;
use crate::ops::view::Bucket;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson<'a> {
    /// 1-based line number in the task file
    pub line: usize,
    #[serde(flatten)]
    pub task: &'a Task,
}

#[derive(Serialize)]
pub struct BucketJson<'a> {
    pub label: &'a str,
    pub tasks: Vec<TaskJson<'a>>,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson<'a> {
    pub timestamp: String,
    pub category: String,
    pub description: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub body: &'a str,
}

pub fn buckets_to_json<'a>(buckets: &'a [Bucket], tasks: &'a [Task]) -> Vec<BucketJson<'a>> {
    buckets
        .iter()
        .map(|b| BucketJson {
            label: &b.label,
            tasks: b
                .entries
                .iter()
                .map(|&i| TaskJson {
                    line: i + 1,
                    task: &tasks[i],
                })
                .collect(),
        })
        .collect()
}

pub fn recovery_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson<'_> {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: &entry.description,
        fields: entry
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect(),
        body: &entry.body,
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Grouped view as plain text: a header per bucket, then its task lines
pub fn format_buckets(buckets: &[Bucket], tasks: &[Task]) -> String {
    let mut out = String::new();
    for bucket in buckets {
        out.push_str(&format!("{} ({})\n", bucket.label, bucket.entries.len()));
        for &i in &bucket.entries {
            out.push_str("  ");
            out.push_str(tasks[i].raw.trim());
            out.push('\n');
        }
    }
    out
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> String {
    let mut out = format!(
        "{} {}: {}\n",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    );
    for (key, value) in &entry.fields {
        out.push_str(&format!("  {}: {}\n", key, value));
    }
    for line in entry.body.lines() {
        out.push_str(&format!("  | {}\n", line));
    }
    out
}
