//! File entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

use crate::fs::permissions::mode_bits;

/// A single file or directory entry.
///
/// `FileEntry` is immutable. Directory sizes are reported as `0`.
///
/// # Examples
///
/// ```no_run
/// use fmgr_core::FileEntry;
/// use std::fs;
///
/// let metadata = fs::symlink_metadata("Cargo.toml").unwrap();
/// let entry = FileEntry::new("Cargo.toml".into(), &metadata);
/// assert_eq!(entry.name(), "Cargo.toml");
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    size: u64,
    modified: Option<SystemTime>,
    mode: u32,
    is_dir: bool,
    is_hidden: bool,
    is_symlink: bool,
}

impl FileEntry {
    /// Creates a new `FileEntry` from a path and its metadata.
    ///
    /// Pass `symlink_metadata` to have links reported as links.
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().nfc().collect::<String>())
            .unwrap_or_default();
        let is_hidden = name.starts_with('.');

        Self {
            path,
            name,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
            mode: mode_bits(metadata),
            is_dir: metadata.is_dir(),
            is_hidden,
            is_symlink: metadata.is_symlink(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, NFC-normalised.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Permission bits (`0o7777` mask).
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// A non-directory with any execute bit set.
    pub fn is_executable(&self) -> bool {
        !self.is_dir && self.mode & 0o111 != 0
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}
