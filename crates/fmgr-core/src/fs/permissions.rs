//! Octal permission parsing, inspection and `ls -l` style formatting.

use std::fs;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Parses an octal mode such as `"755"` or `"0644"`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] for non-octal text or values above `0o7777`.
pub fn parse_mode(text: &str) -> CoreResult<u32> {
    let invalid = || CoreError::InvalidArgument(format!("invalid octal mode: '{text}'"));
    let mode = u32::from_str_radix(text.trim(), 8).map_err(|_| invalid())?;
    if mode > 0o7777 {
        return Err(invalid());
    }
    Ok(mode)
}

/// Permission bits of `metadata`.
///
/// Platforms without Unix modes get a synthesized value from the read-only flag.
pub fn mode_bits(metadata: &fs::Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o7777
    }
    #[cfg(not(unix))]
    {
        match (metadata.is_dir(), metadata.permissions().readonly()) {
            (true, _) => 0o755,
            (false, true) => 0o444,
            (false, false) => 0o644,
        }
    }
}

/// Applies `mode` to `path`.
///
/// On non-Unix hosts only the owner write bit is honoured (as read-only).
pub fn change_permissions(path: &Path, mode: u32) -> CoreResult<()> {
    let metadata = fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    let mut permissions = metadata.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(mode);
    }
    #[cfg(not(unix))]
    permissions.set_readonly(mode & 0o200 == 0);

    fs::set_permissions(path, permissions).map_err(|e| CoreError::from_io(path, e))?;
    tracing::debug!(path = %path.display(), mode = format_args!("{mode:o}"), "permissions changed");
    Ok(())
}

/// Current `rwx` bits of `path` as an octal string, e.g. `"644"`.
pub fn get_permissions(path: &Path) -> CoreResult<String> {
    let metadata = fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    Ok(format!("{:o}", mode_bits(&metadata) & 0o777))
}

/// `ls -l` style description of `metadata`, e.g. `drwxr-xr-x`.
pub fn format_permissions(metadata: &fs::Metadata) -> String {
    format_mode(type_char(&metadata.file_type()), mode_bits(metadata))
}

/// Renders a type character followed by the three `rwx` triplets of `mode`.
pub fn format_mode(kind: char, mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn type_char(file_type: &fs::FileType) -> char {
    if file_type.is_dir() {
        return 'd';
    }
    if file_type.is_symlink() {
        return 'l';
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return 'p';
        }
        if file_type.is_socket() {
            return 's';
        }
        if file_type.is_block_device() {
            return 'b';
        }
        if file_type.is_char_device() {
            return 'c';
        }
    }
    '-'
}
