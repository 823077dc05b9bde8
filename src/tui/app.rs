use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::todo_io::{self, StoreError};
use crate::model::{Settings, Task};
use crate::ops::archive;
use crate::ops::task_ops::{self, TaskError};
use crate::ops::view::{self, Bucket};

use super::render;
use super::state::{self, Effect, Projection, UiState};
use super::theme::Theme;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Message shown in the status row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Main application state. Owns the task store, its projection and the
/// single mutable UI state slot.
pub struct App {
    pub path: PathBuf,
    pub tasks: Vec<Task>,
    pub buckets: Vec<Bucket>,
    pub ui: UiState,
    pub theme: Theme,
    pub status: Option<Status>,
    pub today: NaiveDate,
    pub should_quit: bool,
    /// Caret phase for the line editor, flipped by the blink timer
    pub caret_visible: bool,
    /// First visible row of the task list
    pub scroll_offset: usize,
    /// Set once an archive pass wrote month files but could not rewrite the
    /// task file; further passes this session would append the same lines
    pub archive_blocked: bool,
}

impl App {
    pub fn new(path: PathBuf, tasks: Vec<Task>, settings: &Settings, today: NaiveDate) -> Self {
        let mut app = App {
            path,
            tasks,
            buckets: Vec::new(),
            ui: UiState::new(settings.ui.leader_char()),
            theme: Theme::from_config(&settings.ui),
            status: None,
            today,
            should_quit: false,
            caret_visible: true,
            scroll_offset: 0,
            archive_blocked: false,
        };
        app.rebuild();
        app
    }

    /// Recompute the projection from the store and pull the cursor back in range
    pub fn rebuild(&mut self) {
        self.buckets = view::group_visible(&self.tasks, self.today);
        self.ui.cursor = self.ui.cursor.clamp(&self.buckets);
    }

    /// Advance the calendar date used by the display filter
    pub fn set_today(&mut self, today: NaiveDate) {
        if today != self.today {
            self.today = today;
            self.rebuild();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.ui.mode == state::Mode::Normal {
            self.status = None;
        }
        self.caret_visible = true;

        let ui = std::mem::take(&mut self.ui);
        let (next, effect) = state::transition(ui, Projection::new(&self.tasks, &self.buckets), key);
        self.ui = next;
        if let Some(effect) = effect {
            self.apply(effect);
        }
    }

    /// Carry out an effect: mutate, persist, rebuild, place the cursor
    pub fn apply(&mut self, effect: Effect) {
        let result = match effect {
            Effect::Quit => {
                self.should_quit = true;
                return;
            }
            Effect::Notice(msg) => {
                self.status = Some(Status::Info(msg));
                return;
            }
            Effect::Add(text) => task_ops::add_task(&mut self.tasks, &text).map(Some),
            Effect::Replace { index, text } => {
                task_ops::replace_task(&mut self.tasks, index, &text).map(|_| Some(index))
            }
            Effect::MarkDone(index) => task_ops::mark_done(&mut self.tasks, index).map(|_| None),
            Effect::Delete(index) => self.delete(index).map(|_| None),
        };

        match result {
            Ok(follow) => {
                let saved = self.persist();
                self.rebuild();
                if let Some(pos) = follow.and_then(|i| view::position_of(&self.buckets, i)) {
                    self.ui.cursor = pos;
                }
                if let Err(e) = saved {
                    self.status = Some(Status::Error(format!("save failed: {}", e)));
                }
            }
            Err(e @ TaskError::NotFound(_)) => {
                self.status = Some(Status::Error(e.to_string()));
            }
            Err(TaskError::EmptyText) => {}
        }
    }

    fn delete(&mut self, index: usize) -> Result<(), TaskError> {
        let removed = task_ops::delete_task(&mut self.tasks, index)?;
        recovery::log_recovery(
            todo_io::log_dir(&self.path),
            RecoveryEntry::new(RecoveryCategory::Delete, "task deleted")
                .field("File", self.path.display().to_string())
                .body(removed.raw),
        );
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        todo_io::save_tasks(&self.path, &self.tasks)
    }

    /// Move old completed tasks into the monthly archive files. On failure
    /// the store is left as loaded and the error is shown.
    pub fn auto_archive(&mut self, threshold_days: i64) {
        if self.archive_blocked {
            return;
        }
        let dir = todo_io::log_dir(&self.path).to_path_buf();
        match archive::archive(&self.tasks, &dir, self.today, threshold_days) {
            Ok(outcome) if outcome.months.is_empty() => {}
            Ok(outcome) => {
                let count = outcome.archived_count();
                match todo_io::save_tasks(&self.path, &outcome.remaining) {
                    Ok(()) => {
                        self.tasks = outcome.remaining;
                        self.rebuild();
                        self.status = Some(Status::Info(format!(
                            "archived {} completed task{}",
                            count,
                            if count == 1 { "" } else { "s" }
                        )));
                    }
                    Err(e) => {
                        self.archive_blocked = true;
                        log_partial_archive(&dir, &outcome.months, &e);
                        self.status = Some(Status::Error(format!(
                            "archive not saved, month files already hold {} task{}: {}",
                            count,
                            if count == 1 { "" } else { "s" },
                            e
                        )));
                    }
                }
            }
            Err(e) => {
                archive::log_archive_failure(&dir, &e);
                self.status = Some(Status::Error(format!("archive failed: {}", e)));
            }
        }
    }

    /// Flip the caret phase when the blink interval has passed
    fn tick(&mut self, last_blink: &mut Instant) {
        if last_blink.elapsed() >= BLINK_INTERVAL {
            self.caret_visible = !self.caret_visible;
            *last_blink = Instant::now();
        }
    }
}

/// Month files were written but the task file still holds their lines
fn log_partial_archive(dir: &Path, months: &[archive::ArchivedMonth], err: &StoreError) {
    let files: Vec<String> = months
        .iter()
        .map(|m| format!("{} ({})", m.path.display(), m.count))
        .collect();
    recovery::log_recovery(
        dir,
        RecoveryEntry::new(
            RecoveryCategory::Archive,
            "archived tasks were not removed from the task file",
        )
        .field("Months", files.join(", "))
        .field("Error", err.to_string()),
    );
}

/// Run the TUI against the task file at `path`
pub fn run(path: &Path, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let (tasks, load_err) = todo_io::load_tasks_or_empty(path);

    let mut app = App::new(path.to_path_buf(), tasks, settings, today);
    match load_err {
        Some(e) => app.status = Some(Status::Error(e.to_string())),
        None if settings.archive.auto_archive => {
            app.auto_archive(settings.archive.threshold_days);
        }
        None => {}
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_blink = Instant::now();
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                    last_blink = Instant::now();
                }
                // Redrawn at the top of the loop with the new size
                Event::Resize(_, _) => {}
                _ => {}
            }
        } else {
            app.tick(&mut last_blink);
            app.set_today(Local::now().date_naive());
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_line;
    use crate::tui::state::Mode;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::fs;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn app_with(tmp: &TempDir, content: &str) -> App {
        let path = tmp.path().join("todo.txt");
        fs::write(&path, content).unwrap();
        let tasks = todo_io::load_tasks(&path).unwrap();
        App::new(path, tasks, &Settings::default(), today())
    }

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn press_code(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn file(app: &App) -> String {
        fs::read_to_string(&app.path).unwrap()
    }

    #[test]
    fn add_persists_and_moves_cursor_to_new_task() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "(A) first\n");
        press(&mut app, ":add (B) second @home");
        press_code(&mut app, KeyCode::Enter);

        assert_eq!(file(&app), "(A) first\n(B) second @home\n");
        assert_eq!(app.ui.mode, Mode::Normal);
        assert_eq!(view::task_at(&app.buckets, app.ui.cursor), Some(1));
    }

    #[test]
    fn done_twice_keeps_single_marker() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "Pay rent\n");
        for _ in 0..2 {
            press(&mut app, ":done");
            press_code(&mut app, KeyCode::Enter);
        }
        assert_eq!(file(&app), "x Pay rent\n");
        assert!(app.tasks[0].completed);
    }

    #[test]
    fn leader_delete_sequence() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "a\nb\n");

        press(&mut app, " d");
        press_code(&mut app, KeyCode::Esc);
        assert_eq!(file(&app), "a\nb\n");

        press(&mut app, "j dd");
        assert_eq!(file(&app), "a\n");
        let log = recovery::read_recovery_entries(tmp.path(), None);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].category, RecoveryCategory::Delete);
        assert_eq!(log[0].body, "b");
    }

    #[test]
    fn delete_last_entry_reclamps_cursor() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "a\nb\nc\n");
        press(&mut app, "G");
        press(&mut app, ":del");
        press_code(&mut app, KeyCode::Enter);

        assert_eq!(file(&app), "a\nb\n");
        assert_eq!(app.ui.cursor, view::Cursor::new(0, 1));
        assert_eq!(view::task_at(&app.buckets, app.ui.cursor), Some(1));
    }

    #[test]
    fn insert_edit_replaces_and_follows_task() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "Call mom\nzebra @z\n");
        press(&mut app, "i");
        assert_eq!(app.ui.insert.value(), "Call mom");
        press(&mut app, " @phone");
        press_code(&mut app, KeyCode::Enter);

        assert_eq!(file(&app), "Call mom @phone\nzebra @z\n");
        assert_eq!(app.tasks[0], parse_line("Call mom @phone"));
        // The task now lives in the "phone" bucket
        assert_eq!(app.buckets[app.ui.cursor.bucket].label, "phone");
    }

    #[test]
    fn empty_view_insert_adds() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "");
        press_code(&mut app, KeyCode::Enter);
        press(&mut app, "first task");
        press_code(&mut app, KeyCode::Enter);
        assert_eq!(file(&app), "first task\n");
    }

    #[test]
    fn save_failure_is_visible_and_kept_in_memory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("todo.txt");
        let mut app = App::new(path, Vec::new(), &Settings::default(), today());
        press(&mut app, ":add survive");
        press_code(&mut app, KeyCode::Enter);

        assert_eq!(app.tasks.len(), 1);
        assert!(matches!(app.status, Some(Status::Error(ref m)) if m.starts_with("save failed")));
    }

    #[test]
    fn status_clears_on_next_normal_key() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "a\n");
        press(&mut app, ":bogus");
        press_code(&mut app, KeyCode::Enter);
        assert_eq!(app.status, Some(Status::Info("unknown command: bogus".into())));
        press(&mut app, "j");
        assert_eq!(app.status, None);
    }

    #[test]
    fn quit_sets_flag() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "");
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn old_completed_tasks_hidden_but_kept() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, "x 2025-09-01 old\nopen\n");
        assert_eq!(app.buckets.len(), 1);
        assert_eq!(app.buckets[0].entries, vec![1]);
        assert_eq!(app.tasks.len(), 2);
    }

    #[test]
    fn auto_archive_moves_old_tasks() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "x 2025-09-01 old\nopen\n");
        app.auto_archive(5);

        assert_eq!(file(&app), "open\n");
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("todo_archive_2025_09.txt")).unwrap(),
            "x 2025-09-01 old\n"
        );
        assert_eq!(app.status, Some(Status::Info("archived 1 completed task".into())));
    }

    #[test]
    fn auto_archive_save_failure_is_logged_and_not_repeated() {
        let tmp = TempDir::new().unwrap();
        // A directory where the task file should be makes the rewrite fail
        let path = tmp.path().join("todo.txt");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();
        let tasks = vec![parse_line("x 2025-09-01 old"), parse_line("open")];
        let mut app = App::new(path, tasks, &Settings::default(), today());

        app.auto_archive(5);
        let month = tmp.path().join("todo_archive_2025_09.txt");
        assert_eq!(fs::read_to_string(&month).unwrap(), "x 2025-09-01 old\n");
        assert_eq!(app.tasks.len(), 2);
        assert!(app.archive_blocked);
        assert!(matches!(app.status, Some(Status::Error(ref m)) if m.starts_with("archive not saved")));

        let log = recovery::read_recovery_entries(tmp.path(), None);
        assert!(log.iter().any(|e| e.category == RecoveryCategory::Archive));

        app.auto_archive(5);
        assert_eq!(fs::read_to_string(&month).unwrap(), "x 2025-09-01 old\n");
    }

    #[test]
    fn auto_archive_nothing_to_do_leaves_file() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "open");
        app.auto_archive(5);
        assert_eq!(file(&app), "open");
        assert_eq!(app.status, None);
    }

    #[test]
    fn day_change_rebuilds_projection() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with(&tmp, "x 2025-09-27 recent\n");
        assert_eq!(app.buckets.len(), 1);
        app.set_today(NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
        assert!(app.buckets.is_empty());
    }
}
