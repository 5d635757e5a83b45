//! freedesktop.org trash: `<root>/files` holds content, `<root>/info` holds
//! one `.trashinfo` record per item.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::info::{TrashInfo, TRASHINFO_EXTENSION};
use super::{
    clear_dir, create_dir, list_names, occupied, trash_source_name, unique_name,
    validate_trash_name, TrashCan, TrashEntry, TrashKind,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone)]
pub struct XdgTrash {
    root: PathBuf,
    files_dir: PathBuf,
    info_dir: PathBuf,
}

impl XdgTrash {
    pub fn new(root: PathBuf) -> Self {
        Self {
            files_dir: root.join("files"),
            info_dir: root.join("info"),
            root,
        }
    }

    /// `$XDG_DATA_HOME/Trash`, falling back to `$HOME/.local/share/Trash`.
    pub fn default_root() -> Option<PathBuf> {
        if let Some(data_home) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(data_home).join("Trash"));
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local").join("share").join("Trash"))
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn info_dir(&self) -> &Path {
        &self.info_dir
    }

    fn info_path(&self, name: &OsStr) -> PathBuf {
        let mut file = name.to_os_string();
        file.push(TRASHINFO_EXTENSION);
        self.info_dir.join(file)
    }

    fn ensure_dirs(&self) -> CoreResult<()> {
        create_dir(&self.files_dir)?;
        create_dir(&self.info_dir)
    }

    fn read_info(&self, name: &OsStr) -> CoreResult<TrashInfo> {
        let info_path = self.info_path(name);
        let content = fs::read_to_string(&info_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(PathBuf::from(name)),
            _ => CoreError::from_io(&info_path, e),
        })?;
        TrashInfo::parse(&content)
    }
}

impl TrashCan for XdgTrash {
    fn kind(&self) -> TrashKind {
        TrashKind::Xdg
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn move_to_trash(&self, path: &Path) -> CoreResult<OsString> {
        let base = trash_source_name(path)?;
        let original = std::path::absolute(path)?;
        self.ensure_dirs()?;

        // An orphaned record also blocks a name, otherwise restore would
        // pick up stale provenance.
        let name = unique_name(&base, |candidate| {
            occupied(&self.files_dir.join(candidate)) || occupied(&self.info_path(candidate))
        });
        let dest = self.files_dir.join(&name);

        fs::rename(path, &dest).map_err(|e| CoreError::from_io(path, e))?;

        let info = TrashInfo::new(original.clone(), Local::now().naive_local());
        if let Err(e) = fs::write(self.info_path(&name), info.to_string()) {
            if let Err(rollback) = fs::rename(&dest, path) {
                tracing::error!(
                    item = %dest.display(),
                    error = %rollback,
                    "could not move item back after failing to record trash info"
                );
            }
            return Err(CoreError::Io(e));
        }

        tracing::info!(from = %original.display(), name = %name.to_string_lossy(), "moved to trash");
        Ok(name)
    }

    fn restore_from_trash(&self, name: &OsStr) -> CoreResult<PathBuf> {
        validate_trash_name(name)?;
        let info = self.read_info(name)?;
        let trashed = self.files_dir.join(name);

        if !occupied(&trashed) {
            return Err(CoreError::NotFound(trashed));
        }
        if occupied(&info.path) {
            return Err(CoreError::AlreadyExists(info.path));
        }
        if let Some(parent) = info.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::from_io(parent, e))?;
        }

        fs::rename(&trashed, &info.path).map_err(|e| CoreError::from_io(&trashed, e))?;
        let info_path = self.info_path(name);
        fs::remove_file(&info_path).map_err(|e| CoreError::from_io(&info_path, e))?;

        tracing::info!(name = %name.to_string_lossy(), to = %info.path.display(), "restored from trash");
        Ok(info.path)
    }

    fn empty_trash(&self) -> CoreResult<()> {
        clear_dir(&self.files_dir)?;
        clear_dir(&self.info_dir)?;
        self.ensure_dirs()?;
        tracing::info!(root = %self.root.display(), "trash emptied");
        Ok(())
    }

    fn list_trash(&self) -> CoreResult<Vec<OsString>> {
        list_names(&self.files_dir)
    }

    fn entries(&self) -> CoreResult<Vec<TrashEntry>> {
        let mut entries = Vec::new();
        for name in self.list_trash()? {
            let info = match self.read_info(&name) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::debug!(name = %name.to_string_lossy(), error = %e, "no usable trash info");
                    None
                }
            };
            entries.push(TrashEntry {
                original_path: info.as_ref().map(|i| i.path.clone()),
                deleted_at: info.and_then(|i| i.deletion_date),
                name,
            });
        }
        Ok(entries)
    }
}
