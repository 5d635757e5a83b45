//! Application configuration loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Name of the per-user state directory under `$HOME`.
pub const STATE_DIR_NAME: &str = ".fmgr";

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "fmgr.log";

/// Top-level application configuration.
///
/// All fields have sensible defaults so fmgr works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub trash: TrashConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// `~/.fmgr/config.toml`, or `None` when `HOME` is not set.
    pub fn default_path() -> Option<PathBuf> {
        state_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        match Self::load(path) {
            Err(CoreError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }
}

/// Returns `~/.fmgr`, or `None` when `HOME` is not set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(STATE_DIR_NAME))
}

/// General file-browsing preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub show_hidden: bool,
    #[serde(default = "default_true")]
    pub dirs_first: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            dirs_first: true,
        }
    }
}

/// Trash location override.
///
/// When `root` is unset the platform default is used (see [`crate::trash`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrashConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Text viewer (`cat`) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default = "default_lines")]
    pub default_lines: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            default_lines: default_lines(),
        }
    }
}

/// Content search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Files larger than this many bytes are skipped by `grep`/`rgrep`.
    #[serde(default = "default_max_content_file_size")]
    pub max_content_file_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_content_file_size: default_max_content_file_size(),
        }
    }
}

/// Operation journal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

/// Output formatting preferences handed to the display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_name_width")]
    pub name_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            name_width: default_name_width(),
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file path; defaults to `~/.fmgr/fmgr.log`.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LogConfig {
    /// The configured log file, falling back to `~/.fmgr/fmgr.log`.
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| state_dir().map(|dir| dir.join(LOG_FILE_NAME)))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_line_length() -> usize {
    100
}

fn default_lines() -> usize {
    20
}

fn default_max_content_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_entries() -> usize {
    1000
}

fn default_date_format() -> String {
    "%d.%m.%Y %H:%M:%S".to_string()
}

fn default_name_width() -> usize {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_general() {
        let config = Config::default();

        assert!(!config.general.show_hidden);
        assert!(config.general.dirs_first);
    }

    #[test]
    fn default_config_viewer_and_search() {
        let config = Config::default();

        assert_eq!(config.viewer.max_line_length, 100);
        assert_eq!(config.viewer.default_lines, 20);
        assert_eq!(config.search.max_content_file_size, 10 * 1024 * 1024);
        assert_eq!(config.journal.max_entries, 1000);
    }

    #[test]
    fn default_config_has_no_trash_override() {
        let config = Config::default();
        assert!(config.trash.root.is_none());
    }

    #[test]
    fn explicit_log_file_wins() {
        let log = LogConfig {
            file: Some(PathBuf::from("/var/log/fmgr.log")),
            ..LogConfig::default()
        };
        assert_eq!(log.resolved_file(), Some(PathBuf::from("/var/log/fmgr.log")));
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[general]
show_hidden = true
dirs_first = false

[trash]
root = "/tmp/my-trash"

[viewer]
max_line_length = 80
default_lines = 40

[search]
max_content_file_size = 1024

[journal]
max_entries = 50

[display]
date_format = "%Y-%m-%d"
name_width = 20

[log]
file = "/tmp/fmgr-test.log"
level = "debug"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(config.general.show_hidden);
        assert!(!config.general.dirs_first);
        assert_eq!(config.trash.root, Some(PathBuf::from("/tmp/my-trash")));
        assert_eq!(config.viewer.max_line_length, 80);
        assert_eq!(config.viewer.default_lines, 40);
        assert_eq!(config.search.max_content_file_size, 1024);
        assert_eq!(config.journal.max_entries, 50);
        assert_eq!(config.display.date_format, "%Y-%m-%d");
        assert_eq!(config.display.name_width, 20);
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/fmgr-test.log")));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn load_partial_toml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[general]
show_hidden = true
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(config.general.show_hidden);
        assert!(config.general.dirs_first);
        assert_eq!(config.viewer.default_lines, 20);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join("nonexistent.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_or_default(&tmp.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config.viewer.default_lines, 20);
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid [[[toml").unwrap();

        let result = Config::load_or_default(&path);
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }
}
