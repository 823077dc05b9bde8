use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Absolute path of the active task file. None = default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Run an archive pass when the TUI starts
    #[serde(default = "default_true")]
    pub auto_archive: bool,
    /// Days a completed task stays in the active file
    #[serde(default = "default_threshold_days")]
    pub threshold_days: i64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            auto_archive: true,
            threshold_days: default_threshold_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_threshold_days() -> i64 {
    crate::ops::archive::DEFAULT_THRESHOLD_DAYS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Key that starts a two-key sequence in normal mode
    #[serde(default = "default_leader_key")]
    pub leader_key: String,
    /// Theme overrides: slot name -> "#RRGGBB"
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            leader_key: default_leader_key(),
            colors: HashMap::new(),
        }
    }
}

fn default_leader_key() -> String {
    " ".to_string()
}

impl UiConfig {
    /// The leader key as a single character. Anything other than exactly
    /// one character falls back to space.
    pub fn leader_char(&self) -> char {
        let mut chars = self.leader_key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => ' ',
        }
    }
}
