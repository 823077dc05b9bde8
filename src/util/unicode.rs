use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Cells a tab takes in the task list
const TAB_CELLS: usize = 4;

fn is_space(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn grapheme_width(g: &str) -> usize {
    if g == "\t" {
        TAB_CELLS
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_width).sum()
}

/// Cut `s` down to `max_cells`, ending with `…` when anything was dropped.
/// Wide characters are never split.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }

    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Byte offset of the grapheme after the one at `at`, or None at the end
pub fn next_grapheme_boundary(s: &str, at: usize) -> Option<usize> {
    if at >= s.len() {
        return None;
    }
    let step = s[at..].graphemes(true).next().map_or(0, str::len);
    Some(at + step)
}

/// Byte offset of the grapheme before `at`, or None at the start
pub fn prev_grapheme_boundary(s: &str, at: usize) -> Option<usize> {
    if at == 0 {
        return None;
    }
    s[..at].grapheme_indices(true).last().map(|(i, _)| i)
}

/// Start of the word left of `at`, skipping any spaces first
pub fn word_boundary_left(s: &str, at: usize) -> usize {
    let graphemes: Vec<(usize, &str)> = s[..at.min(s.len())].grapheme_indices(true).collect();
    let mut idx = graphemes.len();

    while idx > 0 && is_space(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_space(graphemes[idx - 1].1) {
        idx -= 1;
    }

    graphemes.get(idx).map_or(0, |(i, _)| *i)
}

/// Start of the next word right of `at`
pub fn word_boundary_right(s: &str, at: usize) -> usize {
    if at >= s.len() {
        return s.len();
    }
    let mut rest = s[at..].grapheme_indices(true).skip_while(|(_, g)| !is_space(g));
    rest.find(|(_, g)| !is_space(g))
        .map_or(s.len(), |(i, _)| at + i)
}
