use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::load::default_log_path;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/audioshelf/config.toml` or `~/.config/audioshelf/config.toml`
///
/// Precedence (highest wins):
/// 1) Root directory given on the command line
/// 2) Environment variables (prefix `AUDIOSHELF__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory holding one subdirectory per category.
    pub root: PathBuf,
    /// File extensions accepted for upload (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether symlinked categories and files are followed while listing.
    pub follow_links: bool,
    /// Whether to list hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Where downloaded files are written.
    pub download_dir: PathBuf,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("audio_files"),
            extensions: vec!["mp3".into()],
            follow_links: true,
            include_hidden: false,
            download_dir: PathBuf::from("downloads"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Sort categories and files case-insensitively instead of keeping disk order.
    pub sort_entries: bool,
    /// Shown in place of a duration that could not be read.
    pub unknown_duration: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ audio shelf ~ ".to_string(),
            sort_entries: true,
            unknown_duration: "--:--".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    /// Log file. Logging is disabled when unset because the terminal belongs to the UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: default_log_path(),
        }
    }
}
