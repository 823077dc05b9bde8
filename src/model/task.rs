use chrono::NaiveDate;
use serde::Serialize;

/// Date format used for every date field in a todo line
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One line of the task file, with its fields lifted out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Task {
    /// The line exactly as read or typed. Saving writes this back verbatim.
    pub raw: String,
    /// Leading `x` marker
    pub completed: bool,
    /// `(A)` prefix or `pri:A` token, always an uppercase ASCII letter
    pub priority: Option<char>,
    /// Only set when `completed` is true
    pub completion_date: Option<String>,
    pub creation_date: Option<String>,
    /// Remaining tokens joined by single spaces (None when nothing is left)
    pub description: Option<String>,
    /// `@label` tokens without the sigil, in order of appearance
    pub labels: Vec<String>,
    /// `+project` tokens without the sigil, in order of appearance
    pub projects: Vec<String>,
}

impl Task {
    /// True for empty or whitespace-only lines
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Mark the task complete by prefixing `x ` to its raw text.
    ///
    /// The rest of the line is left as-is (no reparse), and the prefix is
    /// never doubled.
    pub fn mark_done(&mut self) {
        self.completed = true;
        if !self.raw.starts_with("x ") {
            self.raw = format!("x {}", self.raw);
        }
    }

    /// Completion date as a calendar date, if present and valid
    pub fn completion_naive_date(&self) -> Option<NaiveDate> {
        let date = self.completion_date.as_deref()?;
        NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
    }

    /// Text shown for the task in lists: the description, or the raw line
    /// when the line carried no description tokens
    pub fn display_text(&self) -> &str {
        match &self.description {
            Some(d) => d,
            None => self.raw.trim(),
        }
    }

    /// Sort weight for a priority: A = 0 .. Z = 25, unprioritized after all letters
    pub fn priority_rank(&self) -> u32 {
        match self.priority {
            Some(p) if p.is_ascii_uppercase() => p as u32 - 'A' as u32,
            _ => 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(raw: &str) -> Task {
        Task {
            raw: raw.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn mark_done_prefixes_once() {
        let mut t = task("Call mom");
        t.mark_done();
        assert!(t.completed);
        assert_eq!(t.raw, "x Call mom");
        t.mark_done();
        assert_eq!(t.raw, "x Call mom");
    }

    #[test]
    fn mark_done_keeps_existing_marker() {
        let mut t = task("x 2025-09-20 already done");
        t.mark_done();
        assert_eq!(t.raw, "x 2025-09-20 already done");
    }

    #[test]
    fn mark_done_is_case_sensitive() {
        let mut t = task("X marks the spot");
        t.mark_done();
        assert_eq!(t.raw, "x X marks the spot");
    }

    #[test]
    fn priority_rank_orders_letters_before_none() {
        let a = Task {
            priority: Some('A'),
            ..Default::default()
        };
        let z = Task {
            priority: Some('Z'),
            ..Default::default()
        };
        let none = Task::default();
        assert_eq!(a.priority_rank(), 0);
        assert_eq!(z.priority_rank(), 25);
        assert_eq!(none.priority_rank(), 1000);
    }

    #[test]
    fn completion_date_must_be_a_real_date() {
        let mut t = Task {
            completed: true,
            completion_date: Some("2025-09-20".into()),
            ..Default::default()
        };
        assert_eq!(
            t.completion_naive_date(),
            NaiveDate::from_ymd_opt(2025, 9, 20)
        );
        t.completion_date = Some("2025-13-45".into());
        assert_eq!(t.completion_naive_date(), None);
    }

    #[test]
    fn display_text_falls_back_to_raw() {
        let mut t = task("  (A)  ");
        assert_eq!(t.display_text(), "(A)");
        t.description = Some("Buy milk".into());
        assert_eq!(t.display_text(), "Buy milk");
    }
}
