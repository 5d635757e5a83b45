//! `.trashinfo` records.
//!
//! ```text
//! [Trash Info]
//! Path=/home/user/my%20notes.txt
//! DeletionDate=2024-05-01T12:30:00
//! ```
//!
//! `Path` is percent-encoded byte for byte, so names with line breaks or
//! bytes that are not UTF-8 survive the round trip. `/` is left as is.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{CoreError, CoreResult};

/// File extension of metadata records, including the dot.
pub const TRASHINFO_EXTENSION: &str = ".trashinfo";

/// Timestamp layout of the `DeletionDate` key.
pub const DELETION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const HEADER: &str = "[Trash Info]";

/// Provenance of one trashed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashInfo {
    pub path: PathBuf,
    pub deletion_date: Option<NaiveDateTime>,
}

impl TrashInfo {
    pub fn new(path: PathBuf, deletion_date: NaiveDateTime) -> Self {
        Self {
            path,
            deletion_date: Some(deletion_date),
        }
    }

    /// Parses a record. Only `Path` is mandatory; an unreadable
    /// `DeletionDate` is treated as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if there is no non-empty `Path` key.
    pub fn parse(content: &str) -> CoreResult<Self> {
        let mut path = None;
        let mut deletion_date = None;

        for line in content.lines().map(str::trim) {
            if let Some(value) = line.strip_prefix("Path=") {
                if path.is_none() && !value.is_empty() {
                    path = Some(decode_path(value));
                }
            } else if let Some(value) = line.strip_prefix("DeletionDate=") {
                deletion_date = NaiveDateTime::parse_from_str(value, DELETION_DATE_FORMAT).ok();
            }
        }

        let path = path.ok_or_else(|| {
            CoreError::InvalidArgument("trash info record has no original path".to_string())
        })?;
        Ok(Self {
            path,
            deletion_date,
        })
    }
}

impl fmt::Display for TrashInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        writeln!(f, "Path={}", encode_path(&self.path))?;
        if let Some(date) = self.deletion_date {
            writeln!(f, "DeletionDate={}", date.format(DELETION_DATE_FORMAT))?;
        }
        Ok(())
    }
}

fn encode_path(path: &Path) -> String {
    urlencoding::encode_binary(&path_bytes(path)).replace("%2F", "/")
}

fn decode_path(value: &str) -> PathBuf {
    path_from_bytes(urlencoding::decode_binary(value.as_bytes()))
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: Cow<'_, [u8]>) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(&bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Cow<'_, [u8]>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn formats_key_value_block() {
        let info = TrashInfo::new(PathBuf::from("/home/user/notes.txt"), sample_date());
        assert_eq!(
            info.to_string(),
            "[Trash Info]\nPath=/home/user/notes.txt\nDeletionDate=2024-05-01T12:30:00\n"
        );
    }

    #[test]
    fn parses_written_record() {
        let text = "[Trash Info]\nPath=/srv/data/a%20b.txt\nDeletionDate=2024-05-01T12:30:00\n";
        let info = TrashInfo::parse(text).unwrap();
        assert_eq!(info.path, PathBuf::from("/srv/data/a b.txt"));
        assert_eq!(info.deletion_date, Some(sample_date()));
    }

    #[test]
    fn line_break_in_path_is_escaped() {
        let path = PathBuf::from("/tmp/line1\nline2.txt");
        let info = TrashInfo::new(path.clone(), sample_date());

        let text = info.to_string();

        assert!(text.contains("Path=/tmp/line1%0Aline2.txt\n"), "{text}");
        assert_eq!(TrashInfo::parse(&text).unwrap().path, path);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_survives_round_trip() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/tmp/caf\xe9.txt"));
        let info = TrashInfo::new(path.clone(), sample_date());

        let text = info.to_string();

        assert!(text.contains("Path=/tmp/caf%E9.txt\n"), "{text}");
        assert_eq!(TrashInfo::parse(&text).unwrap().path, path);
    }

    #[test]
    fn bad_date_is_unknown() {
        let info = TrashInfo::parse("[Trash Info]\nPath=/x\nDeletionDate=yesterday\n").unwrap();
        assert_eq!(info.path, PathBuf::from("/x"));
        assert!(info.deletion_date.is_none());
    }

    #[test]
    fn missing_path_is_an_error() {
        let result = TrashInfo::parse("[Trash Info]\nDeletionDate=2024-05-01T12:30:00\n");
        assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn first_path_wins() {
        let info = TrashInfo::parse("Path=/first\nPath=/second\n").unwrap();
        assert_eq!(info.path, PathBuf::from("/first"));
    }
}
