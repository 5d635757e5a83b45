//! Lazy traversal of archive sources into `(path, member name)` pairs.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};

/// One filesystem object destined for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub path: PathBuf,
    /// Relative, `/`-separated member name.
    pub name: String,
    pub is_dir: bool,
}

/// Depth-first walk over several sources.
///
/// A file source yields its base name. A directory source yields itself and
/// every descendant, named relative to the directory's parent so the
/// directory name is kept as a prefix. Siblings are visited in file-name
/// order. Symlinks below a source are not followed and are skipped.
pub struct SourceWalk {
    sources: std::vec::IntoIter<PathBuf>,
    current: Option<CurrentSource>,
}

struct CurrentSource {
    root: PathBuf,
    prefix: String,
    entries: walkdir::IntoIter,
}

impl SourceWalk {
    pub fn new(sources: &[PathBuf]) -> Self {
        Self {
            sources: sources.to_vec().into_iter(),
            current: None,
        }
    }

    fn open(source: PathBuf) -> CoreResult<CurrentSource> {
        let prefix = match source.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => std::fs::canonicalize(&source)
                .map_err(|e| CoreError::from_io(&source, e))?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| CoreError::InvalidName(source.display().to_string()))?,
        };
        let entries = WalkDir::new(&source)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Ok(CurrentSource {
            root: source,
            prefix,
            entries,
        })
    }
}

impl Iterator for SourceWalk {
    type Item = CoreResult<SourceItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let source = self.sources.next()?;
                match Self::open(source) {
                    Ok(opened) => self.current = Some(opened),
                    Err(e) => return Some(Err(e)),
                }
            }
            let current = self.current.as_mut()?;

            let entry = match current.entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(match e.into_io_error() {
                        Some(io) => CoreError::from_io(path, io),
                        None => CoreError::InvalidArgument(format!(
                            "filesystem loop at {}",
                            path.display()
                        )),
                    }));
                }
                None => {
                    self.current = None;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() && entry.depth() > 0 {
                tracing::warn!(path = %entry.path().display(), "symlink not archived");
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&current.root)
                .unwrap_or_else(|_| Path::new(""));
            return Some(Ok(SourceItem {
                name: member_name(&current.prefix, relative),
                path: entry.path().to_path_buf(),
                is_dir: file_type.is_dir(),
            }));
        }
    }
}

/// Joins `prefix` and the normal components of `relative` with `/`.
fn member_name(prefix: &str, relative: &Path) -> String {
    let mut name = prefix.to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(sources: &[PathBuf]) -> Vec<(String, bool)> {
        SourceWalk::new(sources)
            .map(|item| {
                let item = item.unwrap();
                (item.name, item.is_dir)
            })
            .collect()
    }

    #[test]
    fn file_sources_use_base_names_in_order() {
        let tmp = TempDir::new().unwrap();
        let b = tmp.path().join("b.txt");
        let a = tmp.path().join("a.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        let items = collect(&[b, a]);

        assert_eq!(
            items,
            vec![("b.txt".to_string(), false), ("a.txt".to_string(), false)]
        );
    }

    #[test]
    fn directory_source_keeps_its_name_as_prefix() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("proj");
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("z.md"), "").unwrap();
        fs::write(dir.join("src/main.rs"), "").unwrap();
        fs::write(dir.join("a.toml"), "").unwrap();

        let items = collect(&[dir]);

        assert_eq!(
            items,
            vec![
                ("proj".to_string(), true),
                ("proj/a.toml".to_string(), false),
                ("proj/src".to_string(), true),
                ("proj/src/main.rs".to_string(), false),
                ("proj/z.md".to_string(), false),
            ]
        );
    }

    #[test]
    fn missing_source_yields_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut walk = SourceWalk::new(&[tmp.path().join("ghost")]);
        assert!(matches!(walk.next(), Some(Err(CoreError::NotFound(_)))));
    }

    #[cfg(unix)]
    #[test]
    fn nested_symlinks_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("real.txt"), "").unwrap();
        std::os::unix::fs::symlink("/etc/passwd", dir.join("link")).unwrap();

        let names: Vec<String> = collect(&[dir]).into_iter().map(|(n, _)| n).collect();

        assert_eq!(names, vec!["d", "d/real.txt"]);
    }

    #[test]
    fn member_name_uses_forward_slashes() {
        let relative: PathBuf = ["x", "y", "z.txt"].iter().collect();
        assert_eq!(member_name("root", &relative), "root/x/y/z.txt");
        assert_eq!(member_name("root", Path::new("")), "root");
    }
}
