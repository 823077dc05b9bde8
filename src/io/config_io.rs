use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;
use crate::model::config::Settings;

/// Keys accepted by `tada config set/get`
pub const CONFIG_KEYS: &[&str] = &[
    "file",
    "leader_key",
    "archive.threshold_days",
    "archive.auto_archive",
];

/// Error type for settings I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not locate a config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    NoHomeDir,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0} (available keys: {keys})", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// The tada config directory: `$XDG_CONFIG_HOME/tada` when set, else `~/.tada`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join("tada"));
    }
    home_dir()
        .map(|h| h.join(".tada"))
        .ok_or(ConfigError::NoHomeDir)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Path of the settings file inside a config directory
pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("config.toml")
}

/// Read settings. A missing file means all defaults.
pub fn load_settings(config_dir: &Path) -> Result<Settings, ConfigError> {
    let path = settings_path(config_dir);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Resolve the active task file: explicit override, then the saved
/// setting, then `<config dir>/todo.txt`.
pub fn resolve_task_file(
    override_path: Option<&str>,
    settings: &Settings,
    config_dir: &Path,
) -> PathBuf {
    match override_path.or(settings.file.as_deref()) {
        Some(p) => expand_path(p),
        None => config_dir.join("todo.txt"),
    }
}

/// Expand a leading `~/` and make the path absolute against the current
/// directory.
pub fn expand_path(value: &str) -> PathBuf {
    let path = match (value.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    };
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

/// Read config.toml as an editable document (empty if the file is missing),
/// so `config set` keeps the user's comments and layout.
pub fn read_config_doc(config_dir: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let path = settings_path(config_dir);
    if !path.exists() {
        return Ok(toml_edit::DocumentMut::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(text.parse()?)
}

/// Write the config document back, creating the config directory if needed.
pub fn write_config_doc(
    config_dir: &Path,
    doc: &toml_edit::DocumentMut,
) -> Result<(), ConfigError> {
    let path = settings_path(config_dir);
    fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
        path: config_dir.to_path_buf(),
        source: e,
    })?;
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Set a single key in the config document after validating the value.
/// Returns the value as stored (e.g. the expanded absolute path for `file`).
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: &str,
) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    match key {
        "file" => {
            let abs = expand_path(value).to_string_lossy().to_string();
            doc["file"] = toml_edit::value(abs.as_str());
            Ok(abs)
        }
        "leader_key" => {
            if value.chars().count() != 1 {
                return Err(invalid());
            }
            ensure_table(doc, "ui");
            doc["ui"]["leader_key"] = toml_edit::value(value);
            Ok(value.to_string())
        }
        "archive.threshold_days" => {
            let days: i64 = value.parse().map_err(|_| invalid())?;
            if days < 0 {
                return Err(invalid());
            }
            ensure_table(doc, "archive");
            doc["archive"]["threshold_days"] = toml_edit::value(days);
            Ok(days.to_string())
        }
        "archive.auto_archive" => {
            let flag: bool = value.parse().map_err(|_| invalid())?;
            ensure_table(doc, "archive");
            doc["archive"]["auto_archive"] = toml_edit::value(flag);
            Ok(flag.to_string())
        }
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

fn ensure_table(doc: &mut toml_edit::DocumentMut, name: &str) {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
}

/// Current value of a key as shown by `config get`. `file` reports the
/// resolved path and whether it is the default.
pub fn get_config_value(
    settings: &Settings,
    config_dir: &Path,
    key: &str,
) -> Result<String, ConfigError> {
    match key {
        "file" => {
            let path = resolve_task_file(None, settings, config_dir);
            if settings.file.is_some() {
                Ok(path.display().to_string())
            } else {
                Ok(format!("{} (default)", path.display()))
            }
        }
        "leader_key" => Ok(format!("{:?}", settings.ui.leader_char())),
        "archive.threshold_days" => Ok(settings.archive.threshold_days.to_string()),
        "archive.auto_archive" => Ok(settings.archive.auto_archive.to_string()),
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}
