//! Archive creation.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use xz2::write::XzEncoder;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use super::format::ArchiveFormat;
use super::walk::{SourceItem, SourceWalk};
use crate::error::{CoreError, CoreResult};
use crate::fs::permissions::mode_bits;

const XZ_PRESET: u32 = 6;

/// Packs `sources` into a new archive at `destination`.
///
/// The format comes from `format` when given (and not blank), otherwise from
/// the destination's file name. Every source must exist before anything is
/// written. On failure the partially written destination is removed.
///
/// # Errors
///
/// - [`CoreError::UnsupportedFormat`] if the format cannot be resolved.
/// - [`CoreError::UnsupportedOperation`] for formats that are read-only.
/// - [`CoreError::NotFound`] if a source does not exist.
/// - [`CoreError::Io`] / [`CoreError::Archive`] if writing fails.
pub fn archive_files(
    sources: &[PathBuf],
    destination: &Path,
    format: Option<&str>,
) -> CoreResult<ArchiveFormat> {
    let format = match format.map(str::trim).filter(|f| !f.is_empty()) {
        Some(token) => ArchiveFormat::from_token(token)?,
        None => ArchiveFormat::from_path(destination)?,
    };
    if !format.can_write() {
        return Err(CoreError::UnsupportedOperation(format!(
            "creating {format} archives"
        )));
    }
    if sources.is_empty() {
        return Err(CoreError::InvalidArgument(
            "no files given to archive".to_string(),
        ));
    }
    for source in sources {
        fs::symlink_metadata(source).map_err(|e| CoreError::from_io(source, e))?;
    }

    let file = File::create(destination).map_err(|e| CoreError::from_io(destination, e))?;
    let skip = std::path::absolute(destination)?;

    if let Err(e) = write_archive(file, format, sources, &skip) {
        if let Err(cleanup) = fs::remove_file(destination) {
            tracing::warn!(
                path = %destination.display(),
                error = %cleanup,
                "could not remove partial archive"
            );
        }
        return Err(e);
    }

    tracing::info!(
        archive = %destination.display(),
        format = %format,
        sources = sources.len(),
        "archive created"
    );
    Ok(format)
}

fn write_archive(
    file: File,
    format: ArchiveFormat,
    sources: &[PathBuf],
    skip: &Path,
) -> CoreResult<()> {
    let file = match format {
        ArchiveFormat::Zip => write_zip(file, sources, skip)?,
        ArchiveFormat::Tar => write_tar(file, sources, skip)?,
        ArchiveFormat::TarGz => {
            write_tar(GzEncoder::new(file, flate2::Compression::default()), sources, skip)?
                .finish()?
        }
        ArchiveFormat::TarXz => {
            write_tar(XzEncoder::new(file, XZ_PRESET), sources, skip)?.finish()?
        }
        ArchiveFormat::TarBz2 => {
            return Err(CoreError::UnsupportedOperation(format!(
                "creating {format} archives"
            )))
        }
    };
    file.sync_all()?;
    Ok(())
}

/// Yields the items to archive, leaving out the archive being written.
fn items<'a>(
    sources: &[PathBuf],
    skip: &'a Path,
) -> impl Iterator<Item = CoreResult<SourceItem>> + 'a {
    SourceWalk::new(sources).filter(move |item| match item {
        Ok(item) => std::path::absolute(&item.path)
            .map(|p| p != skip)
            .unwrap_or(true),
        Err(_) => true,
    })
}

fn write_zip(file: File, sources: &[PathBuf], skip: &Path) -> CoreResult<File> {
    let mut writer = zip::ZipWriter::new(file);
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for item in items(sources, skip) {
        let item = item?;
        let metadata = fs::metadata(&item.path).map_err(|e| CoreError::from_io(&item.path, e))?;
        let options = base.unix_permissions(mode_bits(&metadata));

        if item.is_dir {
            writer.add_directory(format!("{}/", item.name), options)?;
        } else {
            writer.start_file(
                item.name.clone(),
                options.large_file(metadata.len() >= u32::MAX as u64),
            )?;
            let mut src = File::open(&item.path).map_err(|e| CoreError::from_io(&item.path, e))?;
            io::copy(&mut src, &mut writer)?;
        }
        tracing::debug!(member = %item.name, "zip member written");
    }

    Ok(writer.finish()?)
}

/// Writes a tar stream into `sink` and returns the sink once the end-of-archive
/// blocks are flushed.
fn write_tar<W: Write>(sink: W, sources: &[PathBuf], skip: &Path) -> CoreResult<W> {
    let mut builder = tar::Builder::new(sink);
    builder.follow_symlinks(false);

    for item in items(sources, skip) {
        let item = item?;
        if item.is_dir {
            builder.append_dir(&item.name, &item.path)?;
        } else {
            builder.append_path_with_name(&item.path, &item.name)?;
        }
        tracing::debug!(member = %item.name, "tar member written");
    }

    Ok(builder.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::reader::list_archive_contents;
    use tempfile::TempDir;

    fn sample_files(tmp: &TempDir) -> Vec<PathBuf> {
        let a = tmp.path().join("file1.txt");
        let b = tmp.path().join("file2.txt");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "two").unwrap();
        vec![a, b]
    }

    #[test]
    fn zip_lists_names_in_written_order() {
        let tmp = TempDir::new().unwrap();
        let sources = sample_files(&tmp);
        let dest = tmp.path().join("out.zip");

        let format = archive_files(&sources, &dest, Some("zip")).unwrap();

        assert_eq!(format, ArchiveFormat::Zip);
        assert_eq!(
            list_archive_contents(&dest).unwrap(),
            vec!["file1.txt", "file2.txt"]
        );
    }

    #[test]
    fn every_writable_tar_format_lists_same_members() {
        let tmp = TempDir::new().unwrap();
        let sources = sample_files(&tmp);

        for ext in ["tar", "tar.gz", "tgz", "tar.xz", "txz"] {
            let dest = tmp.path().join(format!("out.{ext}"));
            archive_files(&sources, &dest, None).unwrap();
            assert_eq!(
                list_archive_contents(&dest).unwrap(),
                vec!["file1.txt", "file2.txt"],
                "format {ext}"
            );
        }
    }

    #[test]
    fn directory_sources_are_prefixed_with_their_name() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("docs");
        fs::create_dir_all(dir.join("img")).unwrap();
        fs::write(dir.join("readme.md"), "# hi").unwrap();
        fs::write(dir.join("img/logo.svg"), "<svg/>").unwrap();
        let dest = tmp.path().join("docs.zip");

        archive_files(&[dir], &dest, None).unwrap();

        assert_eq!(
            list_archive_contents(&dest).unwrap(),
            vec!["docs/", "docs/img/", "docs/img/logo.svg", "docs/readme.md"]
        );
    }

    #[test]
    fn archive_inside_its_own_source_is_not_included() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("self");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        let dest = dir.join("self.tar");

        archive_files(&[dir], &dest, None).unwrap();

        let names = list_archive_contents(&dest).unwrap();
        assert!(names.iter().all(|n| !n.ends_with("self.tar")), "{names:?}");
        assert!(names.iter().any(|n| n == "self/a.txt"));
    }

    #[test]
    fn unknown_format_fails_before_creating_file() {
        let tmp = TempDir::new().unwrap();
        let sources = sample_files(&tmp);
        let dest = tmp.path().join("out.xyz");

        let result = archive_files(&sources, &dest, None);

        assert!(matches!(result, Err(CoreError::UnsupportedFormat(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn bzip2_write_is_unsupported_operation() {
        let tmp = TempDir::new().unwrap();
        let sources = sample_files(&tmp);
        let dest = tmp.path().join("out.tar.bz2");

        let result = archive_files(&sources, &dest, Some("tbz2"));

        assert!(matches!(result, Err(CoreError::UnsupportedOperation(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn missing_source_fails_before_creating_file() {
        let tmp = TempDir::new().unwrap();
        let mut sources = sample_files(&tmp);
        sources.push(tmp.path().join("ghost.txt"));
        let dest = tmp.path().join("out.zip");

        let result = archive_files(&sources, &dest, None);

        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn blank_format_falls_back_to_extension() {
        let tmp = TempDir::new().unwrap();
        let sources = sample_files(&tmp);
        let dest = tmp.path().join("out.tgz");

        let format = archive_files(&sources, &dest, Some("  ")).unwrap();

        assert_eq!(format, ArchiveFormat::TarGz);
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let tmp = TempDir::new().unwrap();
        let sources = sample_files(&tmp);
        let dest = tmp.path().join("bundle.bin");

        assert_eq!(
            archive_files(&sources, &dest, Some("tar")).unwrap(),
            ArchiveFormat::Tar
        );
        assert!(dest.exists());
    }
}
