//! Container format resolution from tokens and file names.

use std::fmt;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Supported container and compression combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
}

/// File name suffixes in match order: compound suffixes precede `.tar`.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::TarGz),
    (".tgz", ArchiveFormat::TarGz),
    (".tar.bz2", ArchiveFormat::TarBz2),
    (".tbz2", ArchiveFormat::TarBz2),
    (".tar.xz", ArchiveFormat::TarXz),
    (".txz", ArchiveFormat::TarXz),
    (".tar", ArchiveFormat::Tar),
    (".zip", ArchiveFormat::Zip),
];

impl ArchiveFormat {
    pub const ALL: [ArchiveFormat; 5] = [
        ArchiveFormat::Zip,
        ArchiveFormat::Tar,
        ArchiveFormat::TarGz,
        ArchiveFormat::TarBz2,
        ArchiveFormat::TarXz,
    ];

    /// Resolves an explicit format argument such as `zip`, `tgz` or `.tar.xz`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedFormat`] for unknown tokens.
    pub fn from_token(token: &str) -> CoreResult<Self> {
        let normalized = token.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "zip" => Ok(Self::Zip),
            "tar" => Ok(Self::Tar),
            "tar.gz" | "tgz" => Ok(Self::TarGz),
            "tar.bz2" | "tbz2" => Ok(Self::TarBz2),
            "tar.xz" | "txz" => Ok(Self::TarXz),
            _ => Err(CoreError::UnsupportedFormat(token.to_string())),
        }
    }

    /// Infers the format from the file name of `path`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedFormat`] when no known suffix matches.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
            .map(|&(_, format)| format)
            .ok_or_else(|| CoreError::UnsupportedFormat(path.display().to_string()))
    }

    /// Whether archives of this format can be created. Bzip2 is read-only.
    pub fn can_write(self) -> bool {
        !matches!(self, Self::TarBz2)
    }

    /// Canonical extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
