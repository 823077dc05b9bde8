use ratatui::style::Color;

use crate::model::UiConfig;
use crate::tui::state::Mode;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    pub accent: Color,
    pub red: Color,
    pub selection_bg: Color,
    /// Bucket header text
    pub header: Color,
    pub priority: Color,
    pub label: Color,
    pub project: Color,
    pub completed: Color,
    pub mode_normal: Color,
    pub mode_insert: Color,
    pub mode_command: Color,
    pub mode_visual: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x26, 0x26, 0x26),
            text: Color::Rgb(0xEE, 0xEE, 0xEE),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            dim: Color::Rgb(0x62, 0x62, 0x62),
            accent: Color::Rgb(0xFF, 0x5F, 0xAF),
            red: Color::Rgb(0xFF, 0x00, 0x00),
            selection_bg: Color::Rgb(0x3A, 0x3A, 0x3A),
            header: Color::Rgb(0xD7, 0x5F, 0xD7),
            priority: Color::Rgb(0xFF, 0xAF, 0x00),
            label: Color::Rgb(0x00, 0xAF, 0xFF),
            project: Color::Rgb(0x00, 0xD7, 0x87),
            completed: Color::Rgb(0x58, 0x58, 0x58),
            mode_normal: Color::Rgb(0x00, 0xAF, 0xFF),
            mode_insert: Color::Rgb(0x00, 0xD7, 0x87),
            mode_command: Color::Rgb(0xFF, 0xAF, 0x00),
            mode_visual: Color::Rgb(0xD7, 0x5F, 0xD7),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the UI settings, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "dim" => theme.dim = color,
                "accent" => theme.accent = color,
                "red" => theme.red = color,
                "selection_bg" => theme.selection_bg = color,
                "header" => theme.header = color,
                "priority" => theme.priority = color,
                "label" => theme.label = color,
                "project" => theme.project = color,
                "completed" => theme.completed = color,
                "mode_normal" => theme.mode_normal = color,
                "mode_insert" => theme.mode_insert = color,
                "mode_command" => theme.mode_command = color,
                "mode_visual" => theme.mode_visual = color,
                _ => {}
            }
        }

        theme
    }

    /// Badge color for a mode
    pub fn mode_color(&self, mode: Mode) -> Color {
        match mode {
            Mode::Normal => self.mode_normal,
            Mode::Insert => self.mode_insert,
            Mode::Command => self.mode_command,
            Mode::Visual => self.mode_visual,
        }
    }
}
