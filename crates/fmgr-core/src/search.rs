//! Recursive search by name, literal text and regular expression.
//!
//! All searches walk `root` depth-first in file-name order without following
//! symlinks. Entries that cannot be read are skipped rather than aborting the
//! walk. Content searches only look at regular text files no larger than
//! `max_size` bytes and report each matching file once.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use globset::Glob;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::error::{CoreError, CoreResult};
use crate::fs::viewer::is_binary;

/// Finds entries below `root` whose name matches the glob `pattern`.
///
/// # Errors
///
/// - [`CoreError::Pattern`] if `pattern` is not a valid glob.
/// - [`CoreError::NotFound`] / [`CoreError::NotADirectory`] for a bad `root`.
pub fn search_by_name(root: &Path, pattern: &str) -> CoreResult<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| CoreError::Pattern(e.to_string()))?
        .compile_matcher();
    check_root(root)?;

    let hits: Vec<PathBuf> = walk(root)
        .filter(|entry| matcher.is_match(entry.file_name()))
        .map(DirEntry::into_path)
        .collect();
    tracing::debug!(root = %root.display(), pattern, hits = hits.len(), "name search finished");
    Ok(hits)
}

/// Finds text files below `root` containing `text` on some line.
///
/// # Errors
///
/// - [`CoreError::InvalidArgument`] if `text` is empty.
/// - [`CoreError::NotFound`] / [`CoreError::NotADirectory`] for a bad `root`.
pub fn search_by_content(root: &Path, text: &str, max_size: u64) -> CoreResult<Vec<PathBuf>> {
    if text.is_empty() {
        return Err(CoreError::InvalidArgument(
            "search text must not be empty".to_string(),
        ));
    }
    search_lines(root, max_size, |line| line.contains(text))
}

/// Finds text files below `root` with a line matching `pattern`.
///
/// # Errors
///
/// - [`CoreError::Pattern`] if `pattern` is not a valid regular expression.
/// - [`CoreError::NotFound`] / [`CoreError::NotADirectory`] for a bad `root`.
pub fn search_by_regex(root: &Path, pattern: &str, max_size: u64) -> CoreResult<Vec<PathBuf>> {
    let regex = Regex::new(pattern).map_err(|e| CoreError::Pattern(e.to_string()))?;
    search_lines(root, max_size, |line| regex.is_match(line))
}

fn check_root(root: &Path) -> CoreResult<()> {
    let metadata = std::fs::metadata(root).map_err(|e| CoreError::from_io(root, e))?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(CoreError::NotADirectory(root.to_path_buf()))
    }
}

fn walk(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
}

fn search_lines<F>(root: &Path, max_size: u64, matches: F) -> CoreResult<Vec<PathBuf>>
where
    F: Fn(&str) -> bool,
{
    check_root(root)?;

    let hits: Vec<PathBuf> = walk(root)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.metadata().is_ok_and(|m| m.len() <= max_size))
        .filter(|entry| file_has_line(entry.path(), &matches))
        .map(DirEntry::into_path)
        .collect();
    tracing::debug!(root = %root.display(), hits = hits.len(), "content search finished");
    Ok(hits)
}

fn file_has_line<F>(path: &Path, matches: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    if is_binary(path).unwrap_or(true) {
        return false;
    }
    let Ok(file) = File::open(path) else {
        return false;
    };

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if matches(line.trim_end_matches(['\n', '\r'])) {
                    return true;
                }
            }
        }
    }
}
