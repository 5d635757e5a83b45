//! Paged text viewing with binary detection.

use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// The number of bytes inspected by [`is_binary`].
const BINARY_CHECK_SIZE: usize = 512;

/// Share of control bytes above which a file counts as binary.
const CONTROL_BYTE_THRESHOLD: f64 = 0.1;

const TRUNCATION_MARKER: &str = "...";

/// A window of lines from a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView {
    pub lines: Vec<String>,
    /// Zero-based index of the first line in `lines`.
    pub start_line: usize,
    /// Number of lines in the whole file.
    pub total_lines: usize,
}

impl TextView {
    /// One-based number of the last shown line, or `None` when nothing is shown.
    pub fn last_line_number(&self) -> Option<usize> {
        (!self.lines.is_empty()).then(|| self.start_line + self.lines.len())
    }
}

/// Reads up to `max_lines` lines starting after `start_line` skipped lines.
///
/// `max_lines == 0` means no limit. Lines longer than `max_line_length`
/// characters are cut and suffixed with `...`. Invalid UTF-8 is replaced
/// lossily, and terminal escape sequences are stripped.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `path` does not exist.
/// - [`CoreError::InvalidArgument`] if `path` is a directory or looks binary.
pub fn view_text_file(
    path: &Path,
    start_line: usize,
    max_lines: usize,
    max_line_length: usize,
) -> CoreResult<TextView> {
    let metadata = fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
    if metadata.is_dir() {
        return Err(CoreError::InvalidArgument(format!(
            "{} is a directory",
            path.display()
        )));
    }
    if is_binary(path)? {
        return Err(CoreError::InvalidArgument(format!(
            "{} is a binary file and cannot be shown as text",
            path.display()
        )));
    }

    let file = fs::File::open(path).map_err(|e| CoreError::from_io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut lines = Vec::new();
    let mut total_lines = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let index = total_lines;
        total_lines += 1;
        if index < start_line || (max_lines > 0 && lines.len() >= max_lines) {
            continue;
        }
        let raw = String::from_utf8_lossy(&buf);
        let line = strip_control(raw.trim_end_matches(['\n', '\r']));
        lines.push(truncate_line(&line, max_line_length));
    }

    Ok(TextView {
        lines,
        start_line,
        total_lines,
    })
}

/// Returns `true` if the first bytes of the file look binary: any NUL byte, or
/// more than 10% control bytes other than tab, newline and carriage return.
pub fn is_binary(path: &Path) -> CoreResult<bool> {
    let mut file = fs::File::open(path).map_err(|e| CoreError::from_io(path, e))?;
    let mut buf = [0u8; BINARY_CHECK_SIZE];
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(looks_binary(&buf[..filled]))
}

fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
        .count();
    control as f64 / sample.len() as f64 > CONTROL_BYTE_THRESHOLD
}

fn truncate_line(line: &str, max_chars: usize) -> String {
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &line[..cut]),
        None => line.to_string(),
    }
}

/// Drops ANSI escape sequences and control characters other than tab.
fn strip_control(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.next() {
                // CSI: ESC [ ... final byte
                Some('[') => {
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() || next == '~' {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... BEL or ESC \
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if c == '\t' || !c.is_control() {
            result.push(c);
        }
    }

    result
}
