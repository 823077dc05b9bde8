use std::sync::LazyLock;

use regex::Regex;

use crate::model::task::Task;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern compiles"));

/// Parse one todo.txt line into a task.
///
/// Never fails: anything unrecognized ends up in the description, and the
/// input is kept verbatim in `raw`. Field order on a well-formed line:
///
/// ```text
/// [x] [(A)] [completion-date] [creation-date] description @label +project pri:A
/// ```
///
/// Each prefix field is tried once, in that order, at the current position.
pub fn parse_line(line: &str) -> Task {
    let mut task = Task {
        raw: line.to_string(),
        ..Default::default()
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return task;
    }

    let mut idx = 0;

    if tokens[idx] == "x" {
        task.completed = true;
        idx += 1;
    }

    // `(A)` is only honored on open tasks
    if !task.completed
        && let Some(p) = tokens.get(idx).and_then(|t| priority_prefix(t))
    {
        task.priority = Some(p);
        idx += 1;
    }

    if task.completed && tokens.get(idx).is_some_and(|t| is_date(t)) {
        task.completion_date = Some(tokens[idx].to_string());
        idx += 1;
    }

    if tokens.get(idx).is_some_and(|t| is_date(t)) {
        task.creation_date = Some(tokens[idx].to_string());
        idx += 1;
    }

    let rest = &tokens[idx..];
    if rest.is_empty() {
        return task;
    }

    for token in rest {
        if let Some(label) = token.strip_prefix('@') {
            task.labels.push(label.to_string());
        } else if let Some(project) = token.strip_prefix('+') {
            task.projects.push(project.to_string());
        } else if let Some(p) = pri_token(token) {
            task.priority = Some(p);
        }
    }
    task.description = Some(rest.join(" "));

    task
}

/// Parse every line of a task file, one task per line (blank lines included)
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Task> {
    lines.iter().map(|l| parse_line(l.as_ref())).collect()
}

/// Strict `YYYY-MM-DD` shape check. Validity of the date itself is checked
/// only where a date is used.
pub fn is_date(token: &str) -> bool {
    DATE_RE.is_match(token)
}

/// `(A)`: exactly three bytes, uppercase ASCII letter in the middle
fn priority_prefix(token: &str) -> Option<char> {
    match token.as_bytes() {
        [b'(', p, b')'] if p.is_ascii_uppercase() => Some(*p as char),
        _ => None,
    }
}

/// `pri:A`: exactly five bytes, uppercase ASCII letter last
fn pri_token(token: &str) -> Option<char> {
    let rest = token.strip_prefix("pri:")?;
    match rest.as_bytes() {
        [p] if p.is_ascii_uppercase() => Some(*p as char),
        _ => None,
    }
}
