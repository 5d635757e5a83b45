//! Current-directory tracking for the shell.
//!
//! The [`Navigator`] keeps the working directory as plain state instead of
//! changing the process-wide one, so every user-supplied path is resolved
//! through [`Navigator::resolve`].

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::fs::ops::read_directory;
use crate::nav::filter::{sort_entries, SortDirection, SortField};
use crate::nav::history::History;

#[derive(Debug, Clone)]
pub struct Navigator {
    current: PathBuf,
    history: History,
}

impl Navigator {
    /// Starts at `start`, which must be an existing directory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if `start` does not exist.
    /// - [`CoreError::NotADirectory`] if `start` is not a directory.
    pub fn new(start: &Path) -> CoreResult<Self> {
        Ok(Self {
            current: checked_dir(start)?,
            history: History::new(),
        })
    }

    pub fn current_dir(&self) -> &Path {
        &self.current
    }

    /// Resolves a user argument against the current directory.
    ///
    /// `~` and `~/...` expand to the home directory; absolute paths are
    /// returned unchanged.
    pub fn resolve(&self, arg: &str) -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            if arg == "~" {
                return PathBuf::from(home);
            }
            if let Some(rest) = arg.strip_prefix("~/") {
                return PathBuf::from(home).join(rest);
            }
        }
        self.current.join(arg)
    }

    /// Moves to `arg`, recording the directory being left in the history.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the target does not exist.
    /// - [`CoreError::NotADirectory`] if the target is not a directory.
    pub fn change_directory(&mut self, arg: &str) -> CoreResult<&Path> {
        let target = self.resolve(arg);
        self.go_to(&target)
    }

    /// Like [`Navigator::change_directory`] for an already resolved path.
    pub fn go_to(&mut self, target: &Path) -> CoreResult<&Path> {
        let target = checked_dir(target)?;
        if target != self.current {
            let left = std::mem::replace(&mut self.current, target);
            self.history = self.history.push(left);
        }
        tracing::debug!(dir = %self.current.display(), "changed directory");
        Ok(&self.current)
    }

    /// Returns to the previously visited directory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidArgument`] if there is no previous directory.
    /// - [`CoreError::NotFound`] if it no longer exists; the history is left as is.
    pub fn back(&mut self) -> CoreResult<&Path> {
        let (history, target) = self
            .history
            .go_back(self.current.clone())
            .ok_or_else(|| CoreError::InvalidArgument("no previous directory".to_string()))?;
        self.step(history, &target)
    }

    /// Undoes the last [`Navigator::back`].
    ///
    /// # Errors
    ///
    /// Same as [`Navigator::back`], for the forward direction.
    pub fn forward(&mut self) -> CoreResult<&Path> {
        let (history, target) = self
            .history
            .go_forward(self.current.clone())
            .ok_or_else(|| CoreError::InvalidArgument("no next directory".to_string()))?;
        self.step(history, &target)
    }

    /// Lists the current directory: directories first, then by name.
    pub fn list_directory(&self) -> CoreResult<Vec<FileEntry>> {
        let entries = read_directory(&self.current)?;
        Ok(sort_entries(
            &entries,
            SortField::Name,
            SortDirection::Ascending,
            true,
        ))
    }

    fn step(&mut self, history: History, target: &Path) -> CoreResult<&Path> {
        self.current = checked_dir(target)?;
        self.history = history;
        Ok(&self.current)
    }
}

fn checked_dir(path: &Path) -> CoreResult<PathBuf> {
    let metadata = std::fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    if !metadata.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }
    path.canonicalize().map_err(|e| CoreError::from_io(path, e))
}
