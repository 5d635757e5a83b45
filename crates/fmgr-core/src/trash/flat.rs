//! Flat trash directories without metadata (macOS and Windows).

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    clear_dir, create_dir, list_names, occupied, trash_source_name, unique_name, TrashCan,
    TrashKind,
};
use crate::error::{CoreError, CoreResult};

/// Shared behaviour of metadata-less trash folders.
#[derive(Debug, Clone)]
struct FlatDir {
    root: PathBuf,
}

impl FlatDir {
    fn move_in(&self, path: &Path) -> CoreResult<OsString> {
        let base = trash_source_name(path)?;
        create_dir(&self.root)?;
        let name = unique_name(&base, |candidate| occupied(&self.root.join(candidate)));
        fs::rename(path, self.root.join(&name)).map_err(|e| CoreError::from_io(path, e))?;
        tracing::info!(from = %path.display(), name = %name.to_string_lossy(), "moved to trash");
        Ok(name)
    }

    fn empty(&self) -> CoreResult<()> {
        clear_dir(&self.root)?;
        create_dir(&self.root)?;
        tracing::info!(root = %self.root.display(), "trash emptied");
        Ok(())
    }
}

/// `~/.Trash`.
#[derive(Debug, Clone)]
pub struct MacTrash {
    dir: FlatDir,
}

impl MacTrash {
    pub fn new(root: PathBuf) -> Self {
        Self {
            dir: FlatDir { root },
        }
    }

    pub fn default_root() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".Trash"))
    }
}

impl TrashCan for MacTrash {
    fn kind(&self) -> TrashKind {
        TrashKind::MacOs
    }

    fn root(&self) -> &Path {
        &self.dir.root
    }

    fn move_to_trash(&self, path: &Path) -> CoreResult<OsString> {
        self.dir.move_in(path)
    }

    fn restore_from_trash(&self, _name: &OsStr) -> CoreResult<PathBuf> {
        Err(CoreError::RestoreUnsupported(self.kind().label()))
    }

    fn empty_trash(&self) -> CoreResult<()> {
        self.dir.empty()
    }

    fn list_trash(&self) -> CoreResult<Vec<OsString>> {
        list_names(&self.dir.root)
    }
}

/// `%USERPROFILE%\Recycle.Bin`. This is a plain folder, not the shell
/// recycle bin.
#[derive(Debug, Clone)]
pub struct WindowsTrash {
    dir: FlatDir,
}

impl WindowsTrash {
    pub fn new(root: PathBuf) -> Self {
        Self {
            dir: FlatDir { root },
        }
    }

    pub fn default_root() -> Option<PathBuf> {
        std::env::var_os("USERPROFILE").map(|home| PathBuf::from(home).join("Recycle.Bin"))
    }
}

impl TrashCan for WindowsTrash {
    fn kind(&self) -> TrashKind {
        TrashKind::Windows
    }

    fn root(&self) -> &Path {
        &self.dir.root
    }

    fn move_to_trash(&self, path: &Path) -> CoreResult<OsString> {
        self.dir.move_in(path)
    }

    fn restore_from_trash(&self, _name: &OsStr) -> CoreResult<PathBuf> {
        Err(CoreError::RestoreUnsupported(self.kind().label()))
    }

    fn empty_trash(&self) -> CoreResult<()> {
        self.dir.empty()
    }

    fn list_trash(&self) -> CoreResult<Vec<OsString>> {
        list_names(&self.dir.root)
    }
}
