//! Sorting and filtering for file entries.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use globset::{Glob, GlobMatcher};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;

/// The field by which entries are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Sort alphabetically by name (case-insensitive).
    Name,
    /// Sort by file size in bytes.
    Size,
    /// Sort by last-modified time.
    Date,
    /// Sort by file extension (case-insensitive).
    Type,
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest / earliest / A-Z first.
    Ascending,
    /// Largest / latest / Z-A first.
    Descending,
}

/// Sorts a list of file entries by the given field and direction.
///
/// When `dirs_first` is `true`, directories always appear before files
/// regardless of the sort field. Returns a **new** sorted `Vec<FileEntry>`;
/// the input slice is never mutated.
pub fn sort_entries(
    entries: &[FileEntry],
    field: SortField,
    direction: SortDirection,
    dirs_first: bool,
) -> Vec<FileEntry> {
    let mut sorted: Vec<FileEntry> = entries.to_vec();

    sorted.sort_by(|a, b| {
        if dirs_first {
            let dir_cmp = b.is_dir().cmp(&a.is_dir());
            if dir_cmp != std::cmp::Ordering::Equal {
                return dir_cmp;
            }
        }

        let ord = compare_by_field(a, b, field);

        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    sorted
}

fn compare_by_field(a: &FileEntry, b: &FileEntry, field: SortField) -> std::cmp::Ordering {
    match field {
        SortField::Name => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
        SortField::Size => a.size().cmp(&b.size()),
        SortField::Date => a.modified().cmp(&b.modified()),
        SortField::Type => a.extension().cmp(&b.extension()),
    }
}

/// Criteria for narrowing a directory listing.
///
/// The default shows files and directories but hides dot-entries. Extension
/// and size criteria only ever match files, so setting either of them hides
/// directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Lower-cased extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Glob matched against the entry name (`*`, `?`, `[...]`).
    pub name_pattern: Option<String>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    /// Inclusive lower bound on the modification time.
    pub modified_after: Option<NaiveDateTime>,
    /// Inclusive upper bound on the modification time.
    pub modified_before: Option<NaiveDateTime>,
    pub show_dirs: bool,
    pub show_files: bool,
    pub show_hidden: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            name_pattern: None,
            min_size: None,
            max_size: None,
            modified_after: None,
            modified_before: None,
            show_dirs: true,
            show_files: true,
            show_hidden: false,
        }
    }
}

impl FilterOptions {
    /// Default options with the given hidden-file preference.
    pub fn with_hidden(show_hidden: bool) -> Self {
        Self {
            show_hidden,
            ..Self::default()
        }
    }

    /// `true` when no criterion beyond the hidden-file preference is set.
    pub fn is_passthrough(&self) -> bool {
        *self == Self::with_hidden(self.show_hidden)
    }
}

/// Parses `filter` command flags into [`FilterOptions`].
///
/// Recognised flags: `--ext=rs,toml`, `--name=<glob>`, `--size=<min>-<max>`,
/// `--date=<from>..<to>` (dates as `YYYY-MM-DD`, `-` also accepted as the
/// separator) and `--type=` with any of `f`, `d`, `h`. Either bound of a
/// range may be omitted. The upper date bound covers the whole day.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] for unknown flags and malformed
/// values, [`CoreError::Pattern`] for an invalid glob.
pub fn parse_filter_args<S: AsRef<str>>(args: &[S]) -> CoreResult<FilterOptions> {
    let mut options = FilterOptions::default();

    for arg in args {
        let arg = arg.as_ref();
        let (flag, value) = arg
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidArgument(format!("unknown filter flag: {arg}")))?;

        match flag {
            "--ext" => {
                options.extensions = value
                    .split(',')
                    .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect();
            }
            "--name" => {
                if !value.is_empty() {
                    compile_glob(value)?;
                    options.name_pattern = Some(value.to_string());
                }
            }
            "--size" => {
                let (min, max) = value.split_once('-').ok_or_else(|| {
                    CoreError::InvalidArgument(format!("size range must be <min>-<max>: {value}"))
                })?;
                options.min_size = parse_bound(min, parse_size)?;
                options.max_size = parse_bound(max, parse_size)?;
            }
            "--date" => {
                let (from, to) = split_date_range(value)?;
                options.modified_after = parse_bound(from, parse_date)?
                    .map(|d| d.and_time(NaiveTime::MIN));
                options.modified_before = parse_bound(to, parse_date)?
                    .and_then(|d| d.and_hms_opt(23, 59, 59));
            }
            "--type" => {
                options.show_dirs = value.contains('d');
                options.show_files = value.contains('f');
                options.show_hidden = value.contains('h');
                if let Some(bad) = value.chars().find(|c| !matches!(c, 'd' | 'f' | 'h')) {
                    return Err(CoreError::InvalidArgument(format!(
                        "unknown entry type '{bad}' (expected f, d or h)"
                    )));
                }
            }
            _ => {
                return Err(CoreError::InvalidArgument(format!(
                    "unknown filter flag: {flag}"
                )))
            }
        }
    }

    Ok(options)
}

/// Keeps the entries matching every criterion in `options`, preserving order.
///
/// # Errors
///
/// Returns [`CoreError::Pattern`] if the name pattern is not a valid glob.
pub fn apply(entries: &[FileEntry], options: &FilterOptions) -> CoreResult<Vec<FileEntry>> {
    let matcher = options
        .name_pattern
        .as_deref()
        .map(compile_glob)
        .transpose()?;

    Ok(entries
        .iter()
        .filter(|e| matches_entry(e, options, matcher.as_ref()))
        .cloned()
        .collect())
}

fn matches_entry(entry: &FileEntry, options: &FilterOptions, matcher: Option<&GlobMatcher>) -> bool {
    if entry.is_hidden() && !options.show_hidden {
        return false;
    }
    if (entry.is_dir() && !options.show_dirs) || (!entry.is_dir() && !options.show_files) {
        return false;
    }
    if matcher.is_some_and(|m| !m.is_match(entry.name())) {
        return false;
    }
    if !options.extensions.is_empty() {
        let Some(ext) = entry.extension().filter(|_| !entry.is_dir()) else {
            return false;
        };
        if !options.extensions.contains(&ext) {
            return false;
        }
    }
    if options.min_size.is_some() || options.max_size.is_some() {
        if entry.is_dir() {
            return false;
        }
        if options.min_size.is_some_and(|min| entry.size() < min)
            || options.max_size.is_some_and(|max| entry.size() > max)
        {
            return false;
        }
    }
    if options.modified_after.is_some() || options.modified_before.is_some() {
        let Some(modified) = entry.modified() else {
            return false;
        };
        let modified = DateTime::<Local>::from(modified).naive_local();
        if options.modified_after.is_some_and(|after| modified < after)
            || options.modified_before.is_some_and(|before| modified > before)
        {
            return false;
        }
    }
    true
}

fn compile_glob(pattern: &str) -> CoreResult<GlobMatcher> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| CoreError::Pattern(e.to_string()))
}

fn parse_bound<T>(raw: &str, parse: fn(&str) -> CoreResult<T>) -> CoreResult<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}

fn parse_size(raw: &str) -> CoreResult<u64> {
    raw.parse()
        .map_err(|_| CoreError::InvalidArgument(format!("invalid size in bytes: {raw}")))
}

fn parse_date(raw: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidArgument(format!("invalid date (expected YYYY-MM-DD): {raw}")))
}

/// Splits `from..to`, or the dash form `from-to` where each date itself
/// contains dashes (`2024-01-01-2024-12-31`, `-2024-12-31`, `2024-01-01-`).
fn split_date_range(value: &str) -> CoreResult<(&str, &str)> {
    const DATE_LEN: usize = "YYYY-MM-DD".len();

    if let Some(split) = value.split_once("..") {
        return Ok(split);
    }
    if let Some(to) = value.strip_prefix('-') {
        return Ok(("", to));
    }
    if value.len() == DATE_LEN {
        return Ok((value, ""));
    }
    match (value.get(..DATE_LEN), value.get(DATE_LEN..)) {
        (Some(from), Some(rest)) if rest.starts_with('-') => Ok((from, &rest[1..])),
        _ => Err(CoreError::InvalidArgument(format!(
            "date range must be <from>..<to>: {value}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_entries(tmp: &TempDir) -> Vec<FileEntry> {
        fs::write(tmp.path().join("banana.txt"), "12345").unwrap();
        fs::write(tmp.path().join("apple.rs"), "ab").unwrap();
        fs::write(tmp.path().join("cherry.md"), "abcdefghij").unwrap();
        fs::write(tmp.path().join(".hidden.txt"), "h").unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();

        crate::fs::ops::read_directory(tmp.path()).unwrap()
    }

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        let mut names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        names.sort_unstable();
        names
    }

    // --- sort_entries tests ---

    #[test]
    fn sort_by_name_dirs_first() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);

        let sorted = sort_entries(&entries, SortField::Name, SortDirection::Ascending, true);

        let names: Vec<&str> = sorted.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["docs", "src", ".hidden.txt", "apple.rs", "banana.txt", "cherry.md"]
        );
    }

    #[test]
    fn sort_by_size_descending() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);

        let sorted = sort_entries(&entries, SortField::Size, SortDirection::Descending, false);

        let file_entries: Vec<_> = sorted.iter().filter(|e| !e.is_dir()).collect();
        assert!(file_entries[0].size() >= file_entries[1].size());
        assert!(file_entries[1].size() >= file_entries[2].size());
    }

    #[test]
    fn sort_case_insensitive_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Banana.txt"), "").unwrap();
        fs::write(tmp.path().join("apple.txt"), "").unwrap();
        fs::write(tmp.path().join("Cherry.txt"), "").unwrap();

        let entries = crate::fs::ops::read_directory(tmp.path()).unwrap();
        let sorted = sort_entries(&entries, SortField::Name, SortDirection::Ascending, false);

        let names: Vec<&str> = sorted.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["apple.txt", "Banana.txt", "Cherry.txt"]);
    }

    #[test]
    fn sort_dirs_first_with_descending() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("z_file.txt"), "").unwrap();
        fs::create_dir(tmp.path().join("a_dir")).unwrap();
        fs::write(tmp.path().join("a_file.txt"), "").unwrap();
        fs::create_dir(tmp.path().join("z_dir")).unwrap();

        let entries = crate::fs::ops::read_directory(tmp.path()).unwrap();
        let sorted = sort_entries(&entries, SortField::Name, SortDirection::Descending, true);

        let names: Vec<&str> = sorted.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["z_dir", "a_dir", "z_file.txt", "a_file.txt"]);
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);
        let original: Vec<String> = entries.iter().map(|e| e.name().to_owned()).collect();

        let _sorted = sort_entries(&entries, SortField::Type, SortDirection::Descending, false);

        let after: Vec<String> = entries.iter().map(|e| e.name().to_owned()).collect();
        assert_eq!(original, after);
    }

    // --- apply tests ---

    #[test]
    fn default_options_hide_dot_entries() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);

        let kept = apply(&entries, &FilterOptions::default()).unwrap();

        assert_eq!(
            names(&kept),
            vec!["apple.rs", "banana.txt", "cherry.md", "docs", "src"]
        );
        assert_eq!(apply(&entries, &FilterOptions::with_hidden(true)).unwrap().len(), 6);
    }

    #[test]
    fn extension_filter_excludes_directories() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);
        let options = parse_filter_args(&["--ext=TXT,.md"]).unwrap();

        let kept = apply(&entries, &options).unwrap();

        assert_eq!(names(&kept), vec!["banana.txt", "cherry.md"]);
    }

    #[test]
    fn name_glob_matches_whole_name() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);
        let options = parse_filter_args(&["--name=*a*.?s"]).unwrap();

        let kept = apply(&entries, &options).unwrap();

        assert_eq!(names(&kept), vec!["apple.rs"]);
    }

    #[test]
    fn size_range_is_inclusive_and_files_only() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);

        let kept = apply(&entries, &parse_filter_args(&["--size=2-5"]).unwrap()).unwrap();
        assert_eq!(names(&kept), vec!["apple.rs", "banana.txt"]);

        let kept = apply(&entries, &parse_filter_args(&["--size=6-"]).unwrap()).unwrap();
        assert_eq!(names(&kept), vec!["cherry.md"]);
    }

    #[test]
    fn type_selection_replaces_defaults() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);

        let dirs = apply(&entries, &parse_filter_args(&["--type=d"]).unwrap()).unwrap();
        assert_eq!(names(&dirs), vec!["docs", "src"]);

        let hidden_files = apply(&entries, &parse_filter_args(&["--type=fh"]).unwrap()).unwrap();
        assert_eq!(hidden_files.len(), 4);
    }

    #[test]
    fn date_range_covers_today() {
        let tmp = TempDir::new().unwrap();
        let entries = create_test_entries(&tmp);
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

        let options = parse_filter_args(&[format!("--date={today}..{today}")]).unwrap();
        assert_eq!(apply(&entries, &options).unwrap().len(), 5);

        let options = parse_filter_args(&["--date=..2000-01-01"]).unwrap();
        assert!(apply(&entries, &options).unwrap().is_empty());
    }

    // --- parse_filter_args tests ---

    #[test]
    fn no_args_is_passthrough() {
        let options = parse_filter_args::<&str>(&[]).unwrap();
        assert!(options.is_passthrough());
        assert!(!parse_filter_args(&["--ext=rs"]).unwrap().is_passthrough());
    }

    #[test]
    fn dash_separated_dates_are_accepted() {
        let options = parse_filter_args(&["--date=2024-01-01-2024-12-31"]).unwrap();
        assert_eq!(
            options.modified_after,
            NaiveDate::from_ymd_opt(2024, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
        );
        assert_eq!(
            options.modified_before,
            NaiveDate::from_ymd_opt(2024, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59))
        );

        let open_start = parse_filter_args(&["--date=-2024-12-31"]).unwrap();
        assert!(open_start.modified_after.is_none());
        assert!(open_start.modified_before.is_some());

        let open_end = parse_filter_args(&["--date=2024-01-01"]).unwrap();
        assert!(open_end.modified_after.is_some());
        assert!(open_end.modified_before.is_none());
    }

    #[test]
    fn malformed_flags_are_invalid_arguments() {
        for args in [
            "--size=abc-10",
            "--size=10",
            "--date=2024-13-01..",
            "--type=x",
            "--colour=red",
            "--ext",
        ] {
            assert!(
                matches!(parse_filter_args(&[args]), Err(CoreError::InvalidArgument(_))),
                "{args}"
            );
        }
    }

    #[test]
    fn invalid_glob_is_pattern_error() {
        let result = parse_filter_args(&["--name=[unclosed"]);
        assert!(matches!(result, Err(CoreError::Pattern(_))));
    }
}
