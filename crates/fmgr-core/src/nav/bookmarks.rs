//! Bookmark management for fmgr.
//!
//! Provides a named-bookmark system backed by TOML serialisation.
//! Bookmarks map a human-readable label to an absolute directory path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::settings::state_dir;
use crate::error::{CoreError, CoreResult};

/// File name of the bookmark store inside the state directory.
pub const BOOKMARKS_FILE_NAME: &str = "bookmarks.toml";

/// A collection of named bookmarks (label → path).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Bookmarks {
    #[serde(flatten)]
    entries: BTreeMap<String, PathBuf>,
}

impl Bookmarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `~/.fmgr/bookmarks.toml`, or `None` when `HOME` is not set.
    pub fn default_path() -> Option<PathBuf> {
        state_dir().map(|dir| dir.join(BOOKMARKS_FILE_NAME))
    }

    /// Return a new `Bookmarks` with `label` pointing at the directory `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidName`] if the label is blank or contains whitespace.
    /// - [`CoreError::AlreadyExists`] if the label is taken.
    /// - [`CoreError::NotFound`] if `path` does not exist.
    /// - [`CoreError::NotADirectory`] if `path` is not a directory.
    pub fn add(&self, label: &str, path: &Path) -> CoreResult<Self> {
        if label.is_empty() || label.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidName(label.to_string()));
        }
        if self.entries.contains_key(label) {
            return Err(CoreError::AlreadyExists(PathBuf::from(label)));
        }
        let metadata = std::fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(CoreError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = self.entries.clone();
        entries.insert(label.to_string(), std::path::absolute(path)?);
        Ok(Self { entries })
    }

    /// Return a new `Bookmarks` without `label`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for unknown labels.
    pub fn remove(&self, label: &str) -> CoreResult<Self> {
        if !self.entries.contains_key(label) {
            return Err(CoreError::NotFound(PathBuf::from(label)));
        }
        let mut entries = self.entries.clone();
        entries.remove(label);
        Ok(Self { entries })
    }

    /// Look up a bookmark by label.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for unknown labels.
    pub fn get(&self, label: &str) -> CoreResult<&Path> {
        self.entries
            .get(label)
            .map(PathBuf::as_path)
            .ok_or_else(|| CoreError::NotFound(PathBuf::from(label)))
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Iterate over all bookmarks in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(label, path)| (label.as_str(), path.as_path()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load bookmarks from a TOML file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Like [`Bookmarks::load_from_file`], but a missing file is an empty set.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        match Self::load_from_file(path) {
            Err(CoreError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Persist bookmarks to a TOML file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| CoreError::from_io(path, e))?;
        tracing::debug!(path = %path.display(), count = self.len(), "bookmarks saved");
        Ok(())
    }
}
