use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::model::Task;
use crate::ops::view::{self, Bucket};
use crate::util::unicode::{display_width, truncate_to_width};

use super::app::{App, Status};
use super::line_input::LineInput;
use super::state::Mode;
use super::theme::Theme;

const SELECTED_MARKER: &str = "  \u{25B8} ";
const UNSELECTED_MARKER: &str = "    ";
const CARET: &str = "\u{258C}";

/// Main render function: header, task list, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(1),    // task list
            Constraint::Length(1), // status row
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_task_list(frame, app, chunks[1]);
    render_status_row(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let name = app
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let open = app.tasks.iter().filter(|t| !t.completed && !t.is_blank()).count();

    let line = Line::from(vec![
        Span::styled(
            "tada",
            Style::default()
                .fg(app.theme.accent)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", name), Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(
            format!("  {} open", open),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// ---------------------------------------------------------------------------
// Task list
// ---------------------------------------------------------------------------

fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let height = area.height as usize;
    if app.buckets.is_empty() {
        let hint = Line::from(Span::styled(
            " No tasks. Press i to add one, : for commands, q to quit.",
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        ));
        frame.render_widget(Paragraph::new(hint), area);
        return;
    }

    app.scroll_offset = scroll_for(
        &app.buckets,
        app.ui.cursor,
        app.scroll_offset,
        height,
    );

    let lines = list_lines(app, area.width as usize);
    let visible: Vec<Line> = lines
        .into_iter()
        .skip(app.scroll_offset)
        .take(height)
        .collect();
    frame.render_widget(Paragraph::new(visible), area);
}

/// Adjust a scroll offset so the cursor row (and, for the first entry of a
/// bucket, its header) is on screen
pub fn scroll_for(buckets: &[Bucket], cursor: view::Cursor, offset: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    let row = view::flat_row(buckets, cursor);
    let top = if cursor.entry == 0 { row - 1 } else { row };
    let max_offset = view::row_count(buckets).saturating_sub(height);

    let offset = if top < offset {
        top
    } else if row >= offset + height {
        row + 1 - height
    } else {
        offset
    };
    offset.min(max_offset)
}

/// Every row of the grouped view: a header per bucket followed by its tasks
fn list_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let mut lines = Vec::with_capacity(view::row_count(&app.buckets));

    for (b, bucket) in app.buckets.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!(" {} ({})", bucket.label, bucket.entries.len()),
            Style::default()
                .fg(theme.header)
                .bg(theme.background)
                .add_modifier(Modifier::BOLD),
        )));

        for (e, &index) in bucket.entries.iter().enumerate() {
            let selected = app.ui.cursor == view::Cursor::new(b, e);
            lines.push(task_line(&app.tasks[index], selected, width, theme));
        }
    }
    lines
}

/// One task row: marker, completion and priority badges, then the
/// description with its labels, projects and `pri:` tokens colored
pub fn task_line(task: &Task, selected: bool, width: usize, theme: &Theme) -> Line<'static> {
    let bg = if selected {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = if task.completed {
        Style::default()
            .fg(theme.completed)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(theme.text).bg(bg)
    };
    let color = |c: Color| {
        if task.completed {
            base
        } else {
            base.fg(c)
        }
    };

    let marker = if selected {
        SELECTED_MARKER
    } else {
        UNSELECTED_MARKER
    };
    let mut spans = vec![Span::styled(
        marker,
        Style::default().fg(theme.accent).bg(bg),
    )];
    let mut used = display_width(marker);

    if task.completed {
        spans.push(Span::styled("x ", base));
        used += 2;
    }
    if let Some(p) = task.priority {
        spans.push(Span::styled(
            format!("({}) ", p),
            color(theme.priority).add_modifier(Modifier::BOLD),
        ));
        used += 4;
    }

    let text = truncate_to_width(task.display_text(), width.saturating_sub(used));
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            spans.push(Span::styled(" ", base));
        }
        let style = if word.len() > 1 && word.starts_with('@') {
            color(theme.label)
        } else if word.len() > 1 && word.starts_with('+') {
            color(theme.project)
        } else if word.len() == 5 && word.starts_with("pri:") {
            color(theme.priority)
        } else {
            base
        };
        spans.push(Span::styled(word.to_string(), style));
    }

    if selected {
        // Extend the highlight across the row
        let filled = used + display_width(&text);
        if filled < width {
            spans.push(Span::styled(" ".repeat(width - filled), Style::default().bg(bg)));
        }
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Status row
// ---------------------------------------------------------------------------

fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let mode = app.ui.mode;

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(theme.background)
                .bg(theme.mode_color(mode))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default().bg(bg)),
    ];

    let text_style = Style::default().fg(theme.text_bright).bg(bg);
    let dim = Style::default().fg(theme.dim).bg(bg);
    match mode {
        Mode::Normal => {
            if let Some(index) = app.ui.confirm_delete {
                let what = app.tasks.get(index).map(|t| t.display_text()).unwrap_or("");
                spans.push(Span::styled(
                    format!("delete \"{}\"?", what),
                    Style::default().fg(theme.red).bg(bg).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(" d/x/enter confirm, any other key cancels", dim));
            } else if app.ui.pending_leader {
                spans.push(Span::styled("leader: e edit  a add  d delete", text_style));
            } else {
                match &app.status {
                    Some(Status::Error(msg)) => spans.push(Span::styled(
                        msg.clone(),
                        Style::default().fg(theme.red).bg(bg),
                    )),
                    Some(Status::Info(msg)) => spans.push(Span::styled(msg.clone(), text_style)),
                    None => spans.push(Span::styled(": command  i insert  q quit", dim)),
                }
            }
        }
        Mode::Command => {
            spans.push(Span::styled(":", text_style));
            push_input_spans(&mut spans, &app.ui.command, app.caret_visible, text_style, theme);
        }
        Mode::Insert => {
            push_input_spans(&mut spans, &app.ui.insert, app.caret_visible, text_style, theme);
        }
        Mode::Visual => spans.push(Span::styled("esc to return", dim)),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The input buffer with the caret drawn at its position
fn push_input_spans(
    spans: &mut Vec<Span<'static>>,
    input: &LineInput,
    caret_visible: bool,
    style: Style,
    theme: &Theme,
) {
    let (before, after) = input.value().split_at(input.cursor());
    spans.push(Span::styled(before.to_string(), style));
    let caret = if caret_visible { CARET } else { " " };
    spans.push(Span::styled(caret, Style::default().fg(theme.accent).bg(theme.background)));
    spans.push(Span::styled(after.to_string(), style));
}
