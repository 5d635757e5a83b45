//! Filesystem mutations and inspection used by the command layer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::fs::permissions::format_permissions;

/// Detailed description of a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub entry: FileEntry,
    /// Birth time where the platform records one, otherwise the modification time.
    pub created: Option<SystemTime>,
    /// `ls -l` style permission string.
    pub permissions: String,
}

/// Reads the immediate contents of a directory and returns them as [`FileEntry`] values.
///
/// The returned entries are **unsorted**. Use [`crate::nav::filter::sort_entries`]
/// to apply sorting after reading. Entries whose metadata cannot be read are skipped.
///
/// # Errors
///
/// - [`CoreError::NotFound`]: the path does not exist.
/// - [`CoreError::NotADirectory`]: the path is not a directory.
/// - [`CoreError::PermissionDenied`]: read access is denied.
pub fn read_directory(path: &Path) -> CoreResult<Vec<FileEntry>> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }

    let read_dir = fs::read_dir(path).map_err(|e| CoreError::from_io(path, e))?;

    let mut entries = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let metadata = match dir_entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        entries.push(FileEntry::new(dir_entry.path(), &metadata));
    }

    Ok(entries)
}

/// Creates an empty file, leaving an existing file's content untouched.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if the parent directory does not exist.
/// - [`CoreError::InvalidName`] if `path` is an existing directory.
pub fn create_file(path: &Path) -> CoreResult<()> {
    if path.is_dir() {
        return Err(CoreError::InvalidName(format!(
            "{} is a directory",
            path.display()
        )));
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CoreError::from_io(path, e))?;
    tracing::debug!(path = %path.display(), "file created");
    Ok(())
}

/// Creates a directory and any missing parents.
pub fn create_directory(path: &Path) -> CoreResult<()> {
    fs::create_dir_all(path).map_err(|e| CoreError::from_io(path, e))?;
    tracing::debug!(path = %path.display(), "directory created");
    Ok(())
}

/// Where `src` lands when the user names `dest`: inside `dest` when it is an
/// existing directory, otherwise at `dest` itself.
pub fn destination_for(src: &Path, dest: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) if dest.is_dir() => dest.join(name),
        _ => dest.to_path_buf(),
    }
}

/// Copies a file or directory recursively to the destination path.
///
/// Permission bits are carried over. Symlinks inside directories are copied as
/// links rather than followed.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `src` does not exist.
/// - [`CoreError::InvalidArgument`] if `dest` lies inside the directory `src`.
/// - [`CoreError::Io`] for any I/O failure during copy.
pub fn copy_file(src: &Path, dest: &Path) -> CoreResult<()> {
    let meta = fs::symlink_metadata(src).map_err(|e| CoreError::from_io(src, e))?;

    if meta.is_dir() {
        if is_within(dest, src) {
            return Err(CoreError::InvalidArgument(format!(
                "cannot copy {} into itself",
                src.display()
            )));
        }
        copy_dir_recursive(src, dest, 0)?;
    } else {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        copy_leaf(src, dest, meta.is_symlink())?;
    }

    tracing::debug!(from = %src.display(), to = %dest.display(), "copied");
    Ok(())
}

/// Maximum recursion depth for copy_dir_recursive to prevent symlink loops.
const MAX_COPY_DEPTH: usize = 64;

fn copy_dir_recursive(src: &Path, dest: &Path, depth: usize) -> CoreResult<()> {
    if depth > MAX_COPY_DEPTH {
        return Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("maximum recursion depth ({MAX_COPY_DEPTH}) exceeded during copy"),
        )));
    }

    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        let target = dest.join(entry.file_name());
        let ft = entry.file_type()?;

        if ft.is_dir() {
            copy_dir_recursive(&entry_path, &target, depth + 1)?;
        } else {
            copy_leaf(&entry_path, &target, ft.is_symlink())?;
        }
    }

    fs::set_permissions(dest, fs::metadata(src)?.permissions())?;
    Ok(())
}

fn copy_leaf(src: &Path, dest: &Path, is_symlink: bool) -> CoreResult<()> {
    if is_symlink {
        let link_target = fs::read_link(src)?;
        #[cfg(unix)]
        std::os::unix::fs::symlink(&link_target, dest)?;
        #[cfg(not(unix))]
        {
            let _ = link_target;
            fs::copy(src, dest)?;
        }
    } else {
        // std::fs::copy carries the permission bits over.
        fs::copy(src, dest)?;
    }
    Ok(())
}

/// Moves a file or directory to a new location.
///
/// Attempts a fast `rename` first. If rename fails (e.g. cross-device),
/// falls back to copy + delete.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `src` does not exist.
/// - [`CoreError::Io`] for any I/O failure.
pub fn move_file(src: &Path, dest: &Path) -> CoreResult<()> {
    let meta = fs::symlink_metadata(src).map_err(|e| CoreError::from_io(src, e))?;
    if meta.is_dir() && is_within(dest, src) {
        return Err(CoreError::InvalidArgument(format!(
            "cannot move {} into itself",
            src.display()
        )));
    }

    if let Err(e) = fs::rename(src, dest) {
        tracing::debug!(error = %e, "rename failed, falling back to copy and delete");
        copy_file(src, dest)?;
        remove_path(src, &meta)?;
    }

    tracing::debug!(from = %src.display(), to = %dest.display(), "moved");
    Ok(())
}

/// Permanently removes a directory and everything below it.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `path` does not exist.
/// - [`CoreError::NotADirectory`] if `path` is not a directory.
pub fn delete_directory(path: &Path) -> CoreResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    if !meta.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }
    fs::remove_dir_all(path).map_err(|e| CoreError::from_io(path, e))?;
    tracing::debug!(path = %path.display(), "directory deleted permanently");
    Ok(())
}

/// Collects [`FileInfo`] for `path`, following symlinks.
pub fn file_info(path: &Path) -> CoreResult<FileInfo> {
    let metadata = fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    let entry = FileEntry::new(path.to_path_buf(), &metadata);
    Ok(FileInfo {
        created: metadata.created().ok().or_else(|| entry.modified()),
        permissions: format_permissions(&metadata),
        entry,
    })
}

fn remove_path(path: &Path, meta: &fs::Metadata) -> CoreResult<()> {
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Lexical containment check; `path` may not exist yet.
fn is_within(path: &Path, dir: &Path) -> bool {
    let absolute = |p: &Path| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());
    absolute(path).starts_with(absolute(dir))
}
