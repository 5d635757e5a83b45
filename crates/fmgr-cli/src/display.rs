//! Plain-text rendering of command results.
//!
//! Everything here returns a `String`; the app decides where it goes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use fmgr_core::config::settings::DisplayConfig;
use fmgr_core::{CommandCategory, CommandRegistry, FileEntry, FileInfo, JournalEntry, TextView, TrashEntry};

const SIZE_WIDTH: usize = 10;

/// Formatter parameterised by the user's [`DisplayConfig`].
#[derive(Debug, Clone, Default)]
pub struct Display {
    config: DisplayConfig,
}

impl Display {
    /// Falls back to the default date format when the configured one does
    /// not parse, since chrono panics when rendering an invalid format.
    pub fn new(mut config: DisplayConfig) -> Self {
        let invalid = StrftimeItems::new(&config.date_format).any(|item| matches!(item, Item::Error));
        if invalid {
            tracing::warn!(format = %config.date_format, "invalid date format, using default");
            config.date_format = DisplayConfig::default().date_format;
        }
        Self { config }
    }

    /// Formats a timestamp with the configured date format, `-` if unknown.
    pub fn format_time(&self, time: Option<SystemTime>) -> String {
        time.map(|t| DateTime::<Local>::from(t).format(&self.config.date_format).to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    /// One listing row: type, name, size (files only), modification time.
    pub fn entry_row(&self, entry: &FileEntry) -> String {
        let kind = if entry.is_dir() { "DIR " } else { "FILE" };
        let size = if entry.is_dir() {
            String::new()
        } else {
            format_size(entry.size())
        };
        format!(
            "{kind} {name:<width$} {size:<SIZE_WIDTH$} {modified}",
            name = entry.name(),
            width = self.config.name_width,
            modified = self.format_time(entry.modified()),
        )
    }

    /// A full directory listing with a header.
    pub fn listing(&self, dir: &Path, entries: &[FileEntry]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Directory: {}\n", dir.display());
        let header = format!(
            "TYPE {name:<width$} {size:<SIZE_WIDTH$} MODIFIED",
            name = "NAME",
            size = "SIZE",
            width = self.config.name_width,
        );
        let _ = writeln!(out, "{header}");
        let _ = writeln!(out, "{}", "-".repeat(header.len()));
        for entry in entries {
            let _ = writeln!(out, "{}", self.entry_row(entry));
        }
        if entries.is_empty() {
            let _ = writeln!(out, "(empty)");
        }
        out
    }

    /// The `info` report.
    pub fn file_info(&self, info: &FileInfo) -> String {
        let entry = &info.entry;
        let mut out = String::new();
        let _ = writeln!(out, "Information about: {}", entry.name());
        let _ = writeln!(out, "Path: {}", entry.path().display());
        let kind = if entry.is_dir() { "directory" } else { "file" };
        let _ = writeln!(out, "Type: {kind}");
        if !entry.is_dir() {
            let _ = writeln!(out, "Size: {} ({} bytes)", format_size(entry.size()), entry.size());
        }
        let _ = writeln!(out, "Permissions: {}", info.permissions);
        let _ = writeln!(out, "Modified: {}", self.format_time(entry.modified()));
        let _ = writeln!(out, "Created: {}", self.format_time(info.created));
        if entry.is_executable() {
            let _ = writeln!(out, "Executable: yes");
        }
        out
    }

    /// Search hits numbered from 1, shown relative to `base` where possible.
    pub fn search_results(&self, query: &str, hits: &[PathBuf], base: &Path) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Search results for '{query}':");
        let _ = writeln!(out, "Found: {}\n", hits.len());
        for (i, hit) in hits.iter().enumerate() {
            let shown = hit.strip_prefix(base).unwrap_or(hit);
            let _ = writeln!(out, "{}. {}", i + 1, shown.display());
        }
        out
    }

    /// The `cat` window with one-based line numbers and a position footer.
    pub fn text_view(&self, view: &TextView) -> String {
        let mut out = String::new();
        let width = view.total_lines.max(1).to_string().len();
        for (i, line) in view.lines.iter().enumerate() {
            let _ = writeln!(out, "{:>width$} | {line}", view.start_line + i + 1);
        }
        match view.last_line_number() {
            Some(last) => {
                let _ = writeln!(
                    out,
                    "\nLines {}-{last} of {}",
                    view.start_line + 1,
                    view.total_lines
                );
            }
            None => {
                let _ = writeln!(out, "No lines to show ({} in file)", view.total_lines);
            }
        }
        out
    }

    /// `[time] [LEVEL] operation: message (path: ...) [error: ...]`
    pub fn journal_entry(&self, entry: &JournalEntry) -> String {
        let mut line = format!(
            "[{}] [{}] {}: {}",
            entry.timestamp.format(&self.config.date_format),
            entry.level,
            entry.operation,
            entry.message
        );
        if !entry.path.is_empty() {
            let _ = write!(line, " (path: {})", entry.path);
        }
        if let Some(error) = &entry.error {
            let _ = write!(line, " [error: {error}]");
        }
        line
    }

    /// Trash contents, with provenance when the platform records it.
    pub fn trash_entries(&self, entries: &[TrashEntry]) -> String {
        if entries.is_empty() {
            return "Trash is empty\n".to_string();
        }
        let mut out = String::from("Trash contents:\n");
        for (i, entry) in entries.iter().enumerate() {
            let _ = write!(out, "{}. {}", i + 1, entry.name.to_string_lossy());
            if let Some(original) = &entry.original_path {
                let _ = write!(out, " <- {}", original.display());
            }
            if let Some(deleted) = entry.deleted_at {
                let _ = write!(out, " (deleted {})", deleted.format(&self.config.date_format));
            }
            out.push('\n');
        }
        out
    }
}

/// Human-readable size: bytes as an integer, larger units with two decimals.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// `1. item` lines.
pub fn numbered<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}\n", i + 1))
        .collect()
}

/// Command overview grouped by category, in registry order.
pub fn help(registry: &CommandRegistry) -> String {
    let mut out = String::from("Available commands:\n");
    let mut current: Option<CommandCategory> = None;
    for d in registry.all() {
        if current != Some(d.category) {
            let _ = writeln!(out, "\n{}:", d.category.label());
            current = Some(d.category);
        }
        let _ = writeln!(out, "  {:<16} {}", d.name, d.description);
    }
    out.push_str("\nType 'help <command>' for usage.\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fmgr_core::JournalLevel;
    use std::fs;
    use tempfile::TempDir;

    // --- format_size tests ---

    #[test]
    fn format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn format_size_larger_units() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.00 GB");
        assert_eq!(format_size(1024_u64.pow(4)), "1.00 TB");
    }

    // --- listing tests ---

    #[test]
    fn entry_row_pads_name_and_hides_dir_size() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "abc").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let display = Display::default();

        for entry in fmgr_core::read_directory(tmp.path()).unwrap() {
            let row = display.entry_row(&entry);
            if entry.is_dir() {
                assert!(row.starts_with(&format!("DIR  {:<30} {:<10} ", "sub", "")), "{row}");
            } else {
                assert!(row.starts_with(&format!("FILE {:<30} {:<10} ", "a.txt", "3 B")), "{row}");
            }
        }
    }

    #[test]
    fn listing_marks_empty_directories() {
        let tmp = TempDir::new().unwrap();
        let out = Display::default().listing(tmp.path(), &[]);
        assert!(out.contains("(empty)"));
        assert!(out.starts_with("Directory: "));
    }

    #[test]
    fn invalid_date_format_falls_back_to_default() {
        let display = Display::new(DisplayConfig {
            date_format: "broken %".to_string(),
            ..DisplayConfig::default()
        });
        assert_eq!(display.config.date_format, DisplayConfig::default().date_format);
    }

    #[test]
    fn format_time_uses_configured_format() {
        let display = Display::new(DisplayConfig {
            date_format: "%Y".to_string(),
            ..DisplayConfig::default()
        });
        let year = Local::now().format("%Y").to_string();
        assert_eq!(display.format_time(Some(SystemTime::now())), year);
        assert_eq!(display.format_time(None), "-");
    }

    // --- info tests ---

    #[test]
    fn file_info_lists_size_for_files_only() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.bin");
        fs::write(&file, vec![0u8; 2048]).unwrap();
        let display = Display::default();

        let out = display.file_info(&fmgr_core::file_info(&file).unwrap());
        assert!(out.contains("Size: 2.00 KB (2048 bytes)"), "{out}");
        assert!(out.contains("Type: file"));

        let out = display.file_info(&fmgr_core::file_info(tmp.path()).unwrap());
        assert!(!out.contains("Size:"));
        assert!(out.contains("Type: directory"));
    }

    // --- other formatters ---

    #[test]
    fn search_results_are_numbered_relative_to_base() {
        let base = Path::new("/work");
        let hits = vec![PathBuf::from("/work/a.rs"), PathBuf::from("/work/src/b.rs")];

        let out = Display::default().search_results("*.rs", &hits, base);

        assert!(out.contains("Found: 2"));
        assert!(out.contains("1. a.rs\n"));
        assert!(out.contains(&format!("2. {}\n", Path::new("src/b.rs").display())));
    }

    #[test]
    fn text_view_numbers_from_start_line() {
        let view = TextView {
            lines: vec!["third".to_string(), "fourth".to_string()],
            start_line: 2,
            total_lines: 10,
        };

        let out = Display::default().text_view(&view);

        assert!(out.contains(" 3 | third\n"));
        assert!(out.contains(" 4 | fourth\n"));
        assert!(out.contains("Lines 3-4 of 10"));
    }

    #[test]
    fn journal_entry_includes_path_and_error() {
        let entry = JournalEntry {
            timestamp: Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
            level: JournalLevel::Error,
            operation: "cd".to_string(),
            path: "/tmp".to_string(),
            message: "cd nowhere".to_string(),
            error: Some("not found: nowhere".to_string()),
        };

        let line = Display::default().journal_entry(&entry);

        assert_eq!(
            line,
            "[05.03.2024 14:07:09] [ERROR] cd: cd nowhere (path: /tmp) [error: not found: nowhere]"
        );
    }

    #[test]
    fn help_groups_by_category() {
        let out = help(&CommandRegistry::new());
        assert!(out.contains("Navigation:\n"));
        assert!(out.contains("Archive:\n"));
        assert!(out.contains("  list-archive "));
    }

    #[test]
    fn numbered_starts_at_one() {
        assert_eq!(numbered(&["a", "b"]), "1. a\n2. b\n");
    }
}
