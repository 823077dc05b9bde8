use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tada::io::todo_io::{load_tasks, save_tasks};
use tada::parse::{parse_lines, serialize_tasks};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {}", name, e))
}

/// Helper: parse a fixture line by line, serialize it, and assert the lines
/// come back unchanged
fn assert_lines_round_trip(fixture_name: &str) {
    let source = read_fixture(fixture_name);
    let lines: Vec<&str> = source.lines().collect();

    let tasks = parse_lines(&lines);
    let output = serialize_tasks(&tasks);

    assert_eq!(
        output, lines,
        "Round-trip failed for fixture: {}",
        fixture_name
    );
}

/// Helper: load a fixture through the store, save it to a temp file, and
/// assert byte-for-byte equality
fn assert_file_round_trip(fixture_name: &str) {
    let source = read_fixture(fixture_name);
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("todo.txt");
    fs::write(&path, &source).unwrap();

    let tasks = load_tasks(&path).unwrap();
    save_tasks(&path, &tasks).unwrap();

    let output = fs::read_to_string(&path).unwrap();
    assert_eq!(
        output, source,
        "File round-trip failed for fixture: {}",
        fixture_name
    );
}

// ============================================================================
// Line round-trip tests
// ============================================================================

#[test]
fn round_trip_plain_todo() {
    assert_lines_round_trip("todo.txt");
}

#[test]
fn round_trip_messy_lines() {
    assert_lines_round_trip("messy.txt");
}

// ============================================================================
// File round-trip tests
// ============================================================================

#[test]
fn file_round_trip_plain_todo() {
    assert_file_round_trip("todo.txt");
}

#[test]
fn file_round_trip_keeps_blank_lines_and_spacing() {
    assert_file_round_trip("messy.txt");
}

#[test]
fn file_without_trailing_newline_gains_one() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("todo.txt");
    fs::write(&path, "a @x\nb").unwrap();

    let tasks = load_tasks(&path).unwrap();
    assert_eq!(tasks.len(), 2);
    save_tasks(&path, &tasks).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "a @x\nb\n");
}

// ============================================================================
// Parsed fields from the fixtures
// ============================================================================

#[test]
fn fixture_fields_are_parsed() {
    let source = read_fixture("todo.txt");
    let lines: Vec<&str> = source.lines().collect();
    let tasks = parse_lines(&lines);

    let call = &tasks[0];
    assert_eq!(call.priority, Some('A'));
    assert_eq!(call.creation_date.as_deref(), Some("2025-09-28"));
    assert_eq!(call.labels, vec!["phone"]);
    assert_eq!(call.projects, vec!["family"]);
    assert_eq!(
        call.description.as_deref(),
        Some("Call mom @phone +family")
    );

    let taxes = &tasks[3];
    assert!(taxes.completed);
    assert_eq!(taxes.completion_date.as_deref(), Some("2025-09-30"));
    assert_eq!(taxes.creation_date.as_deref(), Some("2025-09-25"));

    let plants = &tasks[5];
    assert_eq!(plants.priority, Some('C'));
    assert_eq!(plants.labels, vec!["home"]);
}

#[test]
fn messy_fixture_edge_cases() {
    let source = read_fixture("messy.txt");
    let lines: Vec<&str> = source.lines().collect();
    let tasks = parse_lines(&lines);

    assert!(tasks[1].is_blank());
    assert_eq!(tasks[2].labels, vec!["work"]);

    // A completed task never takes a `(A)` priority
    assert!(tasks[3].completed);
    assert_eq!(tasks[3].priority, None);

    // Lone sigils still count, with empty names
    assert_eq!(tasks[4].labels, vec![""]);
    assert_eq!(tasks[4].projects, vec![""]);

    assert_eq!(tasks[5].priority, None);
    assert!(!tasks[8].completed);

    assert_eq!(tasks[9].labels, vec!["café"]);
    assert_eq!(tasks[9].projects, vec!["ünï"]);
}
