use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::unicode::{self, word_boundary_left, word_boundary_right};

/// Single-line text buffer with a byte-offset caret (always on a grapheme
/// boundary). Enter and Esc belong to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    value: String,
    cursor: usize,
}

impl LineInput {
    /// A buffer holding `value` with the caret at the end
    pub fn with_value(value: &str) -> Self {
        LineInput {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Apply an editing key. Returns false for keys the editor does not use.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => {
                self.cursor = 0;
            }
            (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => {
                self.cursor = self.value.len();
            }
            // Kill to start of line
            (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
                self.value.drain(..self.cursor);
                self.cursor = 0;
            }
            (m, KeyCode::Char('w')) if m.contains(KeyModifiers::CONTROL) => {
                self.delete_word_back();
            }
            (m, KeyCode::Backspace)
                if m.contains(KeyModifiers::ALT) || m.contains(KeyModifiers::CONTROL) =>
            {
                self.delete_word_back();
            }
            // Readline word movement
            (m, KeyCode::Char('b')) if m.contains(KeyModifiers::ALT) => {
                self.cursor = word_boundary_left(&self.value, self.cursor);
            }
            (m, KeyCode::Char('f')) if m.contains(KeyModifiers::ALT) => {
                self.cursor = word_boundary_right(&self.value, self.cursor);
            }
            (m, KeyCode::Left) if m.contains(KeyModifiers::ALT) => {
                self.cursor = word_boundary_left(&self.value, self.cursor);
            }
            (m, KeyCode::Right) if m.contains(KeyModifiers::ALT) => {
                self.cursor = word_boundary_right(&self.value, self.cursor);
            }
            (_, KeyCode::Left) => {
                if let Some(prev) = unicode::prev_grapheme_boundary(&self.value, self.cursor) {
                    self.cursor = prev;
                }
            }
            (_, KeyCode::Right) => {
                if let Some(next) = unicode::next_grapheme_boundary(&self.value, self.cursor) {
                    self.cursor = next;
                }
            }
            (_, KeyCode::Home) => self.cursor = 0,
            (_, KeyCode::End) => self.cursor = self.value.len(),
            (_, KeyCode::Backspace) => {
                if let Some(prev) = unicode::prev_grapheme_boundary(&self.value, self.cursor) {
                    self.value.drain(prev..self.cursor);
                    self.cursor = prev;
                }
            }
            (_, KeyCode::Delete) => {
                if let Some(next) = unicode::next_grapheme_boundary(&self.value, self.cursor) {
                    self.value.drain(self.cursor..next);
                }
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.insert_char(c);
            }
            _ => return false,
        }
        true
    }

    fn delete_word_back(&mut self) {
        let start = word_boundary_left(&self.value, self.cursor);
        self.value.drain(start..self.cursor);
        self.cursor = start;
    }
}
