//! Error types for `fmgr-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the command layer to
/// display a meaningful message and record the failure in the journal.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path, trash entry, or bookmark does not exist.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to something else.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The destination is already occupied.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// A file, bookmark or trash name is invalid.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A command argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The archive format could not be resolved from a token or file name.
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// The format is recognised but the requested operation is not available.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An archive member would be written outside the extraction directory.
    #[error("path traversal blocked: member '{entry}' resolves to '{resolved}'")]
    PathTraversal { entry: String, resolved: PathBuf },

    /// The current platform's trash keeps no provenance, so nothing can be restored.
    #[error("restoring from the trash is not supported on {0}")]
    RestoreUnsupported(&'static str),

    /// The container library rejected the archive (corrupt header, bad CRC, ...).
    #[error("archive error: {0}")]
    Archive(String),

    /// A glob or regular expression failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(String),

    /// Failed to parse a TOML configuration or bookmark file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps an I/O error on `path` to the closest specific variant.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.into()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` for failures the caller must treat as a security event.
    pub fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }
}

impl From<zip::result::ZipError> for CoreError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::Archive(other.to_string()),
        }
    }
}

/// Convenience alias used throughout `fmgr-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/file"));
        assert_eq!(err.to_string(), "not found: /missing/file");
    }

    #[test]
    fn path_traversal_displays_member_and_target() {
        let err = CoreError::PathTraversal {
            entry: "../../evil.txt".to_string(),
            resolved: PathBuf::from("/evil.txt"),
        };
        let msg = err.to_string();
        assert!(msg.contains("../../evil.txt"));
        assert!(msg.contains("/evil.txt"));
    }

    #[test]
    fn restore_unsupported_names_platform() {
        let err = CoreError::RestoreUnsupported("macOS");
        assert_eq!(
            err.to_string(),
            "restoring from the trash is not supported on macOS"
        );
    }

    #[test]
    fn only_path_traversal_is_security_violation() {
        let traversal = CoreError::PathTraversal {
            entry: "/etc/passwd".to_string(),
            resolved: PathBuf::from("/etc/passwd"),
        };
        assert!(traversal.is_security_violation());
        assert!(!CoreError::UnsupportedFormat("xyz".into()).is_security_violation());
        assert!(!CoreError::NotFound(PathBuf::from("/x")).is_security_violation());
    }

    #[test]
    fn from_io_maps_kinds() {
        let nf = CoreError::from_io("/a", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(nf, CoreError::NotFound(_)));

        let denied =
            CoreError::from_io("/b", io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(matches!(denied, CoreError::PermissionDenied(_)));

        let other = CoreError::from_io("/c", io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(matches!(other, CoreError::Io(_)));
    }

    #[test]
    fn io_error_from_std() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("gone"));
    }

    #[test]
    fn zip_io_error_stays_io() {
        let zip_err = zip::result::ZipError::Io(io::Error::new(io::ErrorKind::Other, "disk"));
        assert!(matches!(CoreError::from(zip_err), CoreError::Io(_)));
    }

    #[test]
    fn zip_format_error_becomes_archive() {
        let zip_err = zip::result::ZipError::InvalidArchive("bad header".into());
        assert!(matches!(CoreError::from(zip_err), CoreError::Archive(_)));
    }
}
