//! Extraction target validation.

use std::path::{Component, Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Resolves the on-disk target of member `name` under `destination`.
///
/// Names are split on both `/` and `\`. A name is rejected when it is
/// absolute, carries a drive designator, or has any `..` segment; the joined
/// path is then normalised and must still lie within `destination`. An empty
/// or `.`-only name resolves to `destination` itself.
///
/// # Errors
///
/// Returns [`CoreError::PathTraversal`] for any rejected name.
pub fn member_target(destination: &Path, name: &str) -> CoreResult<PathBuf> {
    let traversal = |resolved: PathBuf| CoreError::PathTraversal {
        entry: name.to_string(),
        resolved,
    };

    let unified = name.replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(traversal(PathBuf::from(&unified)));
    }

    let mut relative = PathBuf::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(traversal(normalize(&destination.join(&unified)))),
            _ => {
                // A lone segment must stay a single plain component on this host.
                let mut components = Path::new(segment).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => relative.push(segment),
                    _ => return Err(traversal(destination.join(segment))),
                }
            }
        }
    }

    let base = normalize(destination);
    let resolved = normalize(&base.join(&relative));
    if !resolved.starts_with(&base) {
        return Err(traversal(resolved));
    }
    Ok(resolved)
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexically resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            other => result.push(other.as_os_str()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> &'static Path {
        if cfg!(windows) {
            Path::new("C:/extract/here")
        } else {
            Path::new("/extract/here")
        }
    }

    fn assert_blocked(name: &str) {
        let result = member_target(base(), name);
        assert!(
            matches!(result, Err(CoreError::PathTraversal { .. })),
            "{name:?} should be blocked, got {result:?}"
        );
    }

    #[test]
    fn plain_names_resolve_inside() {
        let target = member_target(base(), "dir/sub/file.txt").unwrap();
        assert_eq!(target, base().join("dir").join("sub").join("file.txt"));
    }

    #[test]
    fn dot_segments_and_duplicate_slashes_are_ignored() {
        let target = member_target(base(), "./a//b/./c").unwrap();
        assert_eq!(target, base().join("a").join("b").join("c"));
    }

    #[test]
    fn empty_name_is_destination() {
        assert_eq!(member_target(base(), "./").unwrap(), base());
    }

    #[test]
    fn parent_segments_are_blocked() {
        assert_blocked("../../evil.txt");
        assert_blocked("a/../../evil.txt");
        assert_blocked("a/b/..");
        assert_blocked("..\\windows\\evil.dll");
    }

    #[test]
    fn absolute_and_drive_names_are_blocked() {
        assert_blocked("/etc/passwd");
        assert_blocked("\\server\\share");
        assert_blocked("C:/Windows/System32");
        assert_blocked("c:evil");
    }

    #[test]
    fn traversal_error_names_the_member() {
        match member_target(base(), "../x") {
            Err(CoreError::PathTraversal { entry, .. }) => assert_eq!(entry, "../x"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn dots_inside_names_are_fine() {
        let target = member_target(base(), "v1..2/file..txt").unwrap();
        assert!(target.starts_with(base()));
    }
}
