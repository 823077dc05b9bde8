use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::Task;
use crate::ops::view::{self, Bucket, Cursor};
use crate::tui::line_input::LineInput;

/// Top-level input mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Insert,
    Visual,
}

impl Mode {
    /// Badge text for the status row
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
        }
    }
}

/// Everything the key handler reads and writes, other than the task store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub mode: Mode,
    pub cursor: Cursor,
    /// The leader key was pressed and the next key completes the sequence
    pub pending_leader: bool,
    /// Task index awaiting delete confirmation
    pub confirm_delete: Option<usize>,
    pub command: LineInput,
    pub insert: LineInput,
    /// Task being edited in Insert mode (None = adding a new task)
    pub edit_index: Option<usize>,
    pub leader: char,
}

impl Default for UiState {
    fn default() -> Self {
        UiState::new(' ')
    }
}

impl UiState {
    pub fn new(leader: char) -> Self {
        UiState {
            mode: Mode::Normal,
            cursor: Cursor::default(),
            pending_leader: false,
            confirm_delete: None,
            command: LineInput::default(),
            insert: LineInput::default(),
            edit_index: None,
            leader,
        }
    }
}

/// A change the host must carry out on the task store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Add(String),
    Replace { index: usize, text: String },
    MarkDone(usize),
    Delete(usize),
    /// Informational message for the status row, no store change
    Notice(String),
    Quit,
}

/// The read-only data a key is interpreted against
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    pub tasks: &'a [Task],
    pub buckets: &'a [Bucket],
}

impl<'a> Projection<'a> {
    pub fn new(tasks: &'a [Task], buckets: &'a [Bucket]) -> Self {
        Projection { tasks, buckets }
    }

    fn task_under(&self, cursor: Cursor) -> Option<usize> {
        view::task_at(self.buckets, cursor).filter(|&i| i < self.tasks.len())
    }
}

/// Interpret one key press. Returns the next state and at most one effect;
/// the store itself is never touched here.
pub fn transition(state: UiState, proj: Projection<'_>, key: KeyEvent) -> (UiState, Option<Effect>) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return (state, Some(Effect::Quit));
    }

    match state.mode {
        Mode::Normal => normal(state, proj, key),
        Mode::Command => command(state, proj, key),
        Mode::Insert => insert(state, key),
        Mode::Visual => visual(state, key),
    }
}

// ---------------------------------------------------------------------------
// Normal
// ---------------------------------------------------------------------------

fn normal(mut state: UiState, proj: Projection<'_>, key: KeyEvent) -> (UiState, Option<Effect>) {
    if let Some(index) = state.confirm_delete.take() {
        let effect = match key.code {
            KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Enter => Some(Effect::Delete(index)),
            _ => None,
        };
        return (state, effect);
    }

    if state.pending_leader {
        state.pending_leader = false;
        return leader_sequence(state, proj, key);
    }

    if key.code == KeyCode::Char(state.leader) && !key.modifiers.contains(KeyModifiers::CONTROL) {
        state.pending_leader = true;
        return (state, None);
    }

    let buckets = proj.buckets;
    match (key.modifiers, key.code) {
        (_, KeyCode::Char(':')) => {
            state.mode = Mode::Command;
            state.command.clear();
        }
        (_, KeyCode::Char('i')) | (_, KeyCode::Enter) => {
            state = enter_insert(state, proj);
        }
        (_, KeyCode::Char('v')) => state.mode = Mode::Visual,
        (_, KeyCode::Char('q')) => return (state, Some(Effect::Quit)),

        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => {
            state.cursor = state.cursor.down(buckets);
        }
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => {
            state.cursor = state.cursor.up(buckets);
        }
        (_, KeyCode::Char('l')) | (_, KeyCode::Right) | (_, KeyCode::Tab) => {
            state.cursor = state.cursor.next_bucket(buckets);
        }
        (_, KeyCode::Char('h')) | (_, KeyCode::Left) | (_, KeyCode::BackTab) => {
            state.cursor = state.cursor.prev_bucket(buckets);
        }
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => state.cursor = Cursor::first(),
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => state.cursor = Cursor::last(buckets),
        _ => {}
    }
    (state, None)
}

/// Second key of a leader sequence. The flag is already cleared.
fn leader_sequence(
    mut state: UiState,
    proj: Projection<'_>,
    key: KeyEvent,
) -> (UiState, Option<Effect>) {
    match key.code {
        KeyCode::Char('e') => state = enter_insert(state, proj),
        KeyCode::Char('a') | KeyCode::Char('n') => {
            state.mode = Mode::Command;
            state.command = LineInput::with_value("add ");
        }
        KeyCode::Char('d') | KeyCode::Char('x') => {
            state.confirm_delete = proj.task_under(state.cursor);
        }
        _ => {}
    }
    (state, None)
}

/// Switch to Insert, pre-filled with the task under the cursor if there is one
fn enter_insert(mut state: UiState, proj: Projection<'_>) -> UiState {
    state.mode = Mode::Insert;
    state.edit_index = proj.task_under(state.cursor);
    state.insert = match state.edit_index {
        Some(i) => LineInput::with_value(&proj.tasks[i].raw),
        None => LineInput::default(),
    };
    state
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

fn command(mut state: UiState, proj: Projection<'_>, key: KeyEvent) -> (UiState, Option<Effect>) {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            state.command.clear();
            (state, None)
        }
        KeyCode::Enter => {
            let effect = run_command(state.command.value(), proj.task_under(state.cursor));
            state.mode = Mode::Normal;
            state.command.clear();
            (state, effect)
        }
        _ => {
            state.command.handle_key(key);
            (state, None)
        }
    }
}

/// Turn a command line into an effect. `target` is the task under the cursor.
pub fn run_command(line: &str, target: Option<usize>) -> Option<Effect> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let args = words.collect::<Vec<_>>().join(" ");

    match name {
        "add" if !args.is_empty() => Some(Effect::Add(args)),
        "edit" if !args.is_empty() => target.map(|index| Effect::Replace { index, text: args }),
        "done" => target.map(Effect::MarkDone),
        "delete" | "del" => target.map(Effect::Delete),
        "add" | "edit" => None,
        other => Some(Effect::Notice(format!("unknown command: {}", other))),
    }
}

// ---------------------------------------------------------------------------
// Insert / Visual
// ---------------------------------------------------------------------------

fn insert(mut state: UiState, key: KeyEvent) -> (UiState, Option<Effect>) {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            state.insert.clear();
            state.edit_index = None;
            (state, None)
        }
        KeyCode::Enter => {
            let text = state.insert.value().to_string();
            let effect = if text.is_empty() {
                None
            } else {
                match state.edit_index {
                    Some(index) => Some(Effect::Replace { index, text }),
                    None => Some(Effect::Add(text)),
                }
            };
            state.mode = Mode::Normal;
            state.insert.clear();
            state.edit_index = None;
            (state, effect)
        }
        _ => {
            state.insert.handle_key(key);
            (state, None)
        }
    }
}

fn visual(mut state: UiState, key: KeyEvent) -> (UiState, Option<Effect>) {
    if key.code == KeyCode::Esc {
        state.mode = Mode::Normal;
    }
    (state, None)
}
