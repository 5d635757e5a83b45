//! Soft delete: moving files into a reversible holding area.
//!
//! Every platform gets its own [`TrashCan`] implementation:
//!
//! - [`XdgTrash`]: freedesktop.org layout used on Linux and other Unixes.
//!   Keeps a `.trashinfo` record per item, so items can be restored.
//! - [`MacTrash`]: the flat `~/.Trash` directory. No provenance is kept.
//! - [`WindowsTrash`]: a flat `Recycle.Bin` folder under the user profile.
//!   No provenance is kept.
//!
//! [`platform_trash`] picks the implementation for the host once at startup.
//! All implementations share the same collision rule: a name that is already
//! taken gets `_1`, `_2`, … appended until a free one is found.

pub mod flat;
pub mod info;
pub mod xdg;

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::config::settings::TrashConfig;
use crate::error::{CoreError, CoreResult};

pub use flat::{MacTrash, WindowsTrash};
pub use info::TrashInfo;
pub use xdg::XdgTrash;

/// The trash flavour in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashKind {
    Xdg,
    MacOs,
    Windows,
}

impl TrashKind {
    /// The flavour matching the host operating system.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Xdg
        }
    }

    /// Human-readable platform label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Xdg => "Linux",
            Self::MacOs => "macOS",
            Self::Windows => "Windows",
        }
    }
}

/// One item in the trash.
///
/// `original_path` and `deleted_at` are only known when the platform keeps
/// metadata ([`TrashKind::Xdg`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    /// Stored name, exactly as on disk.
    pub name: OsString,
    pub original_path: Option<PathBuf>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl TrashEntry {
    fn bare(name: OsString) -> Self {
        Self {
            name,
            original_path: None,
            deleted_at: None,
        }
    }
}

/// Capability contract shared by all trash implementations.
pub trait TrashCan {
    /// Which flavour this is.
    fn kind(&self) -> TrashKind;

    /// Directory that holds the trashed content.
    fn root(&self) -> &Path;

    /// Moves `path` into the trash and returns the name it was stored under.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if `path` does not exist.
    /// - [`CoreError::Io`] if the trash directories cannot be created or the
    ///   rename fails (for example across devices).
    fn move_to_trash(&self, path: &Path) -> CoreResult<OsString>;

    /// Moves the trashed item `name` back to where it came from.
    ///
    /// Returns the restored path.
    ///
    /// # Errors
    ///
    /// - [`CoreError::RestoreUnsupported`] on platforms without metadata.
    /// - [`CoreError::NotFound`] if there is no record for `name`.
    /// - [`CoreError::AlreadyExists`] if the original path is occupied.
    /// - [`CoreError::PermissionDenied`] / [`CoreError::Io`] if the record
    ///   cannot be deleted after the item was moved back. The item is then at
    ///   its original path but the record is orphaned; retrying fails with
    ///   [`CoreError::NotFound`].
    fn restore_from_trash(&self, name: &OsStr) -> CoreResult<PathBuf>;

    /// Permanently deletes everything in the trash.
    ///
    /// Stops at the first entry that cannot be removed. The trash directories
    /// exist again afterwards.
    fn empty_trash(&self) -> CoreResult<()>;

    /// Names of the trashed items, in directory order.
    fn list_trash(&self) -> CoreResult<Vec<OsString>>;

    /// Trashed items with whatever provenance is known.
    fn entries(&self) -> CoreResult<Vec<TrashEntry>> {
        Ok(self
            .list_trash()?
            .into_iter()
            .map(TrashEntry::bare)
            .collect())
    }
}

/// Builds the trash for the host platform, honouring a configured root.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if no root is configured and the platform's
/// home-directory variable is unset.
pub fn platform_trash(config: &TrashConfig) -> CoreResult<Box<dyn TrashCan>> {
    trash_for(TrashKind::current(), config.root.clone())
}

/// Builds a specific trash flavour, optionally at an explicit root.
pub fn trash_for(kind: TrashKind, root: Option<PathBuf>) -> CoreResult<Box<dyn TrashCan>> {
    let trash: Box<dyn TrashCan> = match kind {
        TrashKind::Xdg => Box::new(XdgTrash::new(
            root.or_else(XdgTrash::default_root)
                .ok_or_else(|| missing_home("HOME"))?,
        )),
        TrashKind::MacOs => Box::new(MacTrash::new(
            root.or_else(MacTrash::default_root)
                .ok_or_else(|| missing_home("HOME"))?,
        )),
        TrashKind::Windows => Box::new(WindowsTrash::new(
            root.or_else(WindowsTrash::default_root)
                .ok_or_else(|| missing_home("USERPROFILE"))?,
        )),
    };
    tracing::debug!(kind = ?kind, root = %trash.root().display(), "trash initialised");
    Ok(trash)
}

fn missing_home(var: &str) -> CoreError {
    CoreError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("cannot locate the trash: {var} is not set"),
    ))
}

/// Returns the first of `base`, `base_1`, `base_2`, … for which `taken` is false.
pub(crate) fn unique_name(base: &OsStr, taken: impl Fn(&OsStr) -> bool) -> OsString {
    if !taken(base) {
        return base.to_os_string();
    }
    let mut suffix: u64 = 1;
    loop {
        let mut candidate = base.to_os_string();
        candidate.push(format!("_{suffix}"));
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Base name of an existing path that is about to be trashed.
pub(crate) fn trash_source_name(path: &Path) -> CoreResult<OsString> {
    fs::symlink_metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    path.file_name()
        .map(OsStr::to_os_string)
        .ok_or_else(|| CoreError::InvalidName(path.display().to_string()))
}

/// Rejects names that could address something outside the trash directory.
pub(crate) fn validate_trash_name(name: &OsStr) -> CoreResult<()> {
    // Lossy conversion keeps every ASCII byte, which is all this checks.
    let text = name.to_string_lossy();
    if text.is_empty()
        || text == "."
        || text == ".."
        || text.contains('/')
        || text.contains('\\')
        || text.contains('\0')
    {
        return Err(CoreError::InvalidName(text.into_owned()));
    }
    Ok(())
}

/// Whether anything (including a dangling symlink) lives at `path`.
pub(crate) fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Entry names of `dir`; a directory that does not exist yet is empty.
pub(crate) fn list_names(dir: &Path) -> CoreResult<Vec<OsString>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CoreError::from_io(dir, e)),
    };
    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| CoreError::from_io(dir, e))?;
        names.push(entry.file_name());
    }
    Ok(names)
}

/// Removes a file, symlink or directory tree without following symlinks.
pub(crate) fn remove_any(path: &Path) -> CoreResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| CoreError::from_io(path, e))
}

/// Removes every entry of `dir`, stopping at the first failure.
pub(crate) fn clear_dir(dir: &Path) -> CoreResult<()> {
    for name in list_names(dir)? {
        remove_any(&dir.join(name))?;
    }
    Ok(())
}

pub(crate) fn create_dir(dir: &Path) -> CoreResult<()> {
    fs::create_dir_all(dir).map_err(CoreError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn unique_name_returns_base_when_free() {
        assert_eq!(unique_name(OsStr::new("a.txt"), |_| false), "a.txt");
    }

    #[test]
    fn unique_name_counts_up_sequentially() {
        let taken: HashSet<&OsStr> = ["a.txt", "a.txt_1", "a.txt_2"]
            .into_iter()
            .map(OsStr::new)
            .collect();
        assert_eq!(unique_name(OsStr::new("a.txt"), |n| taken.contains(n)), "a.txt_3");
    }

    #[test]
    fn validate_trash_name_rejects_separators_and_dots() {
        assert!(validate_trash_name(OsStr::new("ok.txt")).is_ok());
        for bad in ["", ".", "..", "a/b", "..\\x", "../escape"] {
            assert!(
                matches!(validate_trash_name(OsStr::new(bad)), Err(CoreError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn trash_source_name_requires_existing_path() {
        let tmp = TempDir::new().unwrap();
        let result = trash_source_name(&tmp.path().join("missing"));
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn list_names_of_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(list_names(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn clear_dir_removes_files_and_trees() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f"), "x").unwrap();
        fs::create_dir_all(tmp.path().join("d/nested")).unwrap();
        fs::write(tmp.path().join("d/nested/g"), "y").unwrap();

        clear_dir(tmp.path()).unwrap();

        assert!(list_names(tmp.path()).unwrap().is_empty());
        assert!(tmp.path().exists());
    }

    #[test]
    fn trash_for_uses_explicit_root() {
        let tmp = TempDir::new().unwrap();
        for kind in [TrashKind::Xdg, TrashKind::MacOs, TrashKind::Windows] {
            let trash = trash_for(kind, Some(tmp.path().to_path_buf())).unwrap();
            assert_eq!(trash.kind(), kind);
            assert!(trash.root().starts_with(tmp.path()));
        }
    }
}
