//! Format front-ends that present every container as a sequence of members.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use super::format::ArchiveFormat;
use crate::error::{CoreError, CoreResult};

/// `S_IFMT` / `S_IFLNK` as stored in zip external attributes.
const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_SYMLINK: u32 = 0o120000;

/// What a member represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
    Symlink,
    /// Hard links, devices, FIFOs and other special tar entries.
    Other,
}

/// Header data of one member, as stored in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Name exactly as stored.
    pub name: String,
    pub kind: MemberKind,
    pub mode: Option<u32>,
    pub size: u64,
}

/// Decompressing reader for the tar family.
enum TarStream<R: Read> {
    Plain(R),
    Gzip(Box<GzDecoder<R>>),
    Bzip2(Box<BzDecoder<R>>),
    Xz(Box<XzDecoder<R>>),
}

impl<R: Read> TarStream<R> {
    fn new(reader: R, format: ArchiveFormat) -> Self {
        match format {
            ArchiveFormat::TarGz => Self::Gzip(Box::new(GzDecoder::new(reader))),
            ArchiveFormat::TarBz2 => Self::Bzip2(Box::new(BzDecoder::new(reader))),
            ArchiveFormat::TarXz => Self::Xz(Box::new(XzDecoder::new(reader))),
            ArchiveFormat::Tar | ArchiveFormat::Zip => Self::Plain(reader),
        }
    }
}

impl<R: Read> Read for TarStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Bzip2(d) => d.read(buf),
            Self::Xz(d) => d.read(buf),
        }
    }
}

/// Calls `visit` for every member of `source` in container order, handing it
/// a reader positioned at the member's data.
///
/// Stops at the first error returned by `visit`.
pub fn for_each_member<F>(source: &Path, format: ArchiveFormat, mut visit: F) -> CoreResult<()>
where
    F: FnMut(&ArchiveMember, &mut dyn Read) -> CoreResult<()>,
{
    let file = File::open(source).map_err(|e| CoreError::from_io(source, e))?;

    if format == ArchiveFormat::Zip {
        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let mode = entry.unix_mode();
            let kind = if entry.is_dir() {
                MemberKind::Directory
            } else if mode.is_some_and(|m| m & MODE_TYPE_MASK == MODE_SYMLINK) {
                MemberKind::Symlink
            } else {
                MemberKind::File
            };
            let member = ArchiveMember {
                name: entry.name().to_string(),
                kind,
                mode,
                size: entry.size(),
            };
            visit(&member, &mut entry)?;
        }
        return Ok(());
    }

    let mut archive = tar::Archive::new(TarStream::new(BufReader::new(file), format));
    for entry in archive.entries().map_err(tar_error)? {
        let mut entry = entry.map_err(tar_error)?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let entry_type = entry.header().entry_type();
        let kind = if entry_type.is_dir() {
            MemberKind::Directory
        } else if entry_type.is_symlink() {
            MemberKind::Symlink
        } else if entry_type.is_file() || entry_type.is_contiguous() {
            MemberKind::File
        } else {
            MemberKind::Other
        };
        let member = ArchiveMember {
            name,
            kind,
            mode: entry.header().mode().ok(),
            size: entry.size(),
        };
        visit(&member, &mut entry)?;
    }
    Ok(())
}

/// Member names exactly as stored, in container order.
///
/// # Errors
///
/// - [`CoreError::UnsupportedFormat`] if the format cannot be inferred from `source`.
/// - [`CoreError::NotFound`] if `source` does not exist.
/// - [`CoreError::Archive`] / [`CoreError::Io`] for corrupt containers.
pub fn list_archive_contents(source: &Path) -> CoreResult<Vec<String>> {
    let format = ArchiveFormat::from_path(source)?;
    let mut names = Vec::new();
    for_each_member(source, format, |member, _| {
        names.push(member.name.clone());
        Ok(())
    })?;
    Ok(names)
}

/// Tar reports malformed headers as `io::Error`s of kind `Other`/`InvalidData`.
fn tar_error(err: io::Error) -> CoreError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::Other | io::ErrorKind::UnexpectedEof => {
            CoreError::Archive(err.to_string())
        }
        _ => CoreError::Io(err),
    }
}
