//! Safe extraction shared by all container formats.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use super::format::ArchiveFormat;
use super::reader::{for_each_member, ArchiveMember, MemberKind};
use super::sanitize::member_target;
use crate::error::{CoreError, CoreResult};

/// Summary of a completed extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub files: usize,
    pub directories: usize,
    /// Symlinks and special members that were not materialised.
    pub skipped: usize,
    pub bytes: u64,
}

/// Extracts `source` into `destination`, creating it if needed.
///
/// Every member name is validated before anything is written, so an archive
/// with a single unsafe member leaves the filesystem untouched. Each member
/// is validated again as it is unpacked.
///
/// # Errors
///
/// - [`CoreError::UnsupportedFormat`] if the format cannot be inferred from `source`.
/// - [`CoreError::NotFound`] if `source` does not exist.
/// - [`CoreError::PathTraversal`] if any member would land outside `destination`.
/// - [`CoreError::Archive`] / [`CoreError::Io`] for corrupt containers or write failures.
pub fn extract_archive(source: &Path, destination: &Path) -> CoreResult<ExtractReport> {
    let format = ArchiveFormat::from_path(source)?;
    let root = std::path::absolute(destination)?;

    let result = check_members(source, format, &root).and_then(|()| {
        fs::create_dir_all(&root).map_err(|e| CoreError::from_io(&root, e))?;
        let mut report = ExtractReport::default();
        for_each_member(source, format, |member, reader| {
            unpack_member(&root, member, reader, &mut report)
        })?;
        Ok(report)
    });

    match &result {
        Ok(report) => tracing::info!(
            archive = %source.display(),
            destination = %root.display(),
            files = report.files,
            directories = report.directories,
            skipped = report.skipped,
            "archive extracted"
        ),
        Err(e) if e.is_security_violation() => tracing::error!(
            archive = %source.display(),
            destination = %root.display(),
            error = %e,
            "extraction aborted: archive member escapes destination"
        ),
        Err(_) => {}
    }
    result
}

/// Validates every member name without writing anything.
fn check_members(source: &Path, format: ArchiveFormat, root: &Path) -> CoreResult<()> {
    for_each_member(source, format, |member, _| {
        member_target(root, &member.name).map(|_| ())
    })
}

/// Writes one member below `root`. This is the only place extraction touches
/// the filesystem.
pub(crate) fn unpack_member(
    root: &Path,
    member: &ArchiveMember,
    reader: &mut dyn Read,
    report: &mut ExtractReport,
) -> CoreResult<()> {
    let target = member_target(root, &member.name)?;

    match member.kind {
        MemberKind::Directory => {
            fs::create_dir_all(&target).map_err(|e| CoreError::from_io(&target, e))?;
            report.directories += 1;
        }
        MemberKind::File => {
            if target.as_path() == root {
                return Err(CoreError::InvalidName(member.name.clone()));
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| CoreError::from_io(parent, e))?;
            }
            // Never write through a link that already sits at the target.
            if fs::symlink_metadata(&target).is_ok_and(|m| m.file_type().is_symlink()) {
                fs::remove_file(&target).map_err(|e| CoreError::from_io(&target, e))?;
            }

            let mut out = File::create(&target).map_err(|e| CoreError::from_io(&target, e))?;
            let written = io::copy(reader, &mut out)?;
            out.sync_all()?;
            drop(out);

            #[cfg(unix)]
            if let Some(mode) = member.mode {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))?;
            }

            report.files += 1;
            report.bytes += written;
            tracing::debug!(member = %member.name, bytes = written, "member extracted");
        }
        MemberKind::Symlink | MemberKind::Other => {
            tracing::warn!(member = %member.name, kind = ?member.kind, "special member skipped");
            report.skipped += 1;
        }
    }
    Ok(())
}
