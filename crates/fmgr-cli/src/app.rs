//! Command dispatch for the shell.
//!
//! [`App`] owns all session state. Each input line goes through
//! [`App::execute`], which writes human-readable output to the given sink
//! and records the outcome in the journal.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use fmgr_core::fs::ops::destination_for;
use fmgr_core::fs::permissions::{change_permissions, get_permissions, parse_mode};
use fmgr_core::nav::filter::{apply as apply_filter, parse_filter_args, sort_entries};
use fmgr_core::{
    archive_files, copy_file, create_directory, create_file, delete_directory, extract_archive,
    file_info, list_archive_contents, move_file, search_by_content, search_by_name,
    search_by_regex, tokenize, view_text_file, Bookmarks, Command, CommandRegistry, Config,
    CoreError, CoreResult, FilterOptions, Journal, Navigator, SortDirection, SortField, TrashCan,
};

use crate::display::{self, Display};

/// Entries shown by `log` without an argument.
const DEFAULT_LOG_ENTRIES: usize = 10;

pub struct App {
    config: Config,
    navigator: Navigator,
    bookmarks: Bookmarks,
    /// Where bookmarks are persisted; `None` keeps them in memory only.
    bookmarks_path: Option<PathBuf>,
    trash: Box<dyn TrashCan>,
    journal: Journal,
    filter: FilterOptions,
    registry: CommandRegistry,
    display: Display,
    running: bool,
}

impl App {
    /// Creates a session rooted at `start_dir`.
    ///
    /// # Errors
    ///
    /// Fails if `start_dir` is not a directory or the bookmark file is malformed.
    pub fn new(
        config: Config,
        start_dir: &Path,
        trash: Box<dyn TrashCan>,
        bookmarks_path: Option<PathBuf>,
    ) -> CoreResult<Self> {
        let bookmarks = match &bookmarks_path {
            Some(path) => Bookmarks::load_or_default(path)?,
            None => Bookmarks::new(),
        };
        Ok(Self {
            navigator: Navigator::new(start_dir)?,
            bookmarks,
            bookmarks_path,
            trash,
            journal: Journal::new(config.journal.max_entries),
            filter: FilterOptions::with_hidden(config.general.show_hidden),
            registry: CommandRegistry::new(),
            display: Display::new(config.display.clone()),
            config,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_dir(&self) -> &Path {
        self.navigator.current_dir()
    }

    /// Runs one command line, writing its output to `out`.
    ///
    /// Blank lines are a no-op. The outcome is journaled; failures are also
    /// returned so the caller can report them.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> CoreResult<()> {
        let words = tokenize(line)?;
        let Some((name, args)) = words.split_first() else {
            return Ok(());
        };

        let Some(command) = self.registry.find(name) else {
            let err = self.unknown_command(name);
            self.journal
                .error(name, &self.navigator.current_dir().display().to_string(), line.trim(), &err);
            return Err(err);
        };

        let result = self.dispatch(command, args, out);
        let dir = self.navigator.current_dir().display().to_string();
        match &result {
            Ok(()) => self.journal.info(name, &dir, line.trim()),
            Err(e) => {
                if e.is_security_violation() {
                    tracing::error!(command = %name, error = %e, "security violation blocked");
                }
                self.journal.error(name, &dir, line.trim(), e);
            }
        }
        result
    }

    fn unknown_command(&self, name: &str) -> CoreError {
        let suggestions: Vec<&str> = self.registry.suggest(name).iter().map(|d| d.name).collect();
        if suggestions.is_empty() {
            CoreError::InvalidArgument(format!("unknown command '{name}' (try 'help')"))
        } else {
            CoreError::InvalidArgument(format!(
                "unknown command '{name}'; did you mean: {}?",
                suggestions.join(", ")
            ))
        }
    }

    fn dispatch<W: Write>(&mut self, command: Command, args: &[String], out: &mut W) -> CoreResult<()> {
        match command {
            Command::Help => self.cmd_help(args, out),
            Command::List => {
                self.expect_args(command, args, 0, 0)?;
                self.cmd_list(out)
            }
            Command::ChangeDir => {
                self.expect_args(command, args, 0, 1)?;
                let target = args.first().map_or("~", String::as_str);
                let dir = self.navigator.change_directory(target)?;
                writeln!(out, "{}", dir.display())?;
                Ok(())
            }
            Command::PrintDir => {
                self.expect_args(command, args, 0, 0)?;
                writeln!(out, "{}", self.navigator.current_dir().display())?;
                Ok(())
            }
            Command::Back => {
                self.expect_args(command, args, 0, 0)?;
                let dir = self.navigator.back()?;
                writeln!(out, "{}", dir.display())?;
                Ok(())
            }
            Command::Forward => {
                self.expect_args(command, args, 0, 0)?;
                let dir = self.navigator.forward()?;
                writeln!(out, "{}", dir.display())?;
                Ok(())
            }
            Command::MakeDir => {
                self.expect_args(command, args, 1, 1)?;
                let path = self.navigator.resolve(&args[0]);
                create_directory(&path)?;
                writeln!(out, "Directory created: {}", path.display())?;
                Ok(())
            }
            Command::Touch => {
                self.expect_args(command, args, 1, 1)?;
                let path = self.navigator.resolve(&args[0]);
                create_file(&path)?;
                writeln!(out, "File created: {}", path.display())?;
                Ok(())
            }
            Command::Remove => {
                self.expect_args(command, args, 1, 1)?;
                let path = self.navigator.resolve(&args[0]);
                let name = self.trash.move_to_trash(&path)?;
                writeln!(out, "Moved to trash as '{}'", name.to_string_lossy())?;
                Ok(())
            }
            Command::RemoveDir => {
                self.expect_args(command, args, 1, 1)?;
                let path = self.navigator.resolve(&args[0]);
                delete_directory(&path)?;
                writeln!(out, "Directory deleted: {}", path.display())?;
                Ok(())
            }
            Command::Copy | Command::Move => {
                self.expect_args(command, args, 2, 2)?;
                let src = self.navigator.resolve(&args[0]);
                let dest = destination_for(&src, &self.navigator.resolve(&args[1]));
                if command == Command::Copy {
                    copy_file(&src, &dest)?;
                    writeln!(out, "Copied to {}", dest.display())?;
                } else {
                    move_file(&src, &dest)?;
                    writeln!(out, "Moved to {}", dest.display())?;
                }
                Ok(())
            }
            Command::Chmod => {
                self.expect_args(command, args, 2, 2)?;
                let mode = parse_mode(&args[0])?;
                let path = self.navigator.resolve(&args[1]);
                change_permissions(&path, mode)?;
                writeln!(out, "Permissions of {} set to {}", path.display(), get_permissions(&path)?)?;
                Ok(())
            }
            Command::Find | Command::Grep | Command::RegexGrep => self.cmd_search(command, args, out),
            Command::Info => {
                self.expect_args(command, args, 1, 1)?;
                let info = file_info(&self.navigator.resolve(&args[0]))?;
                write!(out, "{}", self.display.file_info(&info))?;
                Ok(())
            }
            Command::Cat => self.cmd_cat(args, out),
            Command::Filter => self.cmd_filter(args, out),
            Command::Archive => self.cmd_archive(args, out),
            Command::Extract => {
                self.expect_args(command, args, 2, 2)?;
                let source = self.navigator.resolve(&args[0]);
                let destination = self.navigator.resolve(&args[1]);
                let report = extract_archive(&source, &destination)?;
                writeln!(
                    out,
                    "Extracted {} files and {} directories ({}) into {}",
                    report.files,
                    report.directories,
                    display::format_size(report.bytes),
                    destination.display()
                )?;
                if report.skipped > 0 {
                    writeln!(out, "Skipped {} links or special entries", report.skipped)?;
                }
                Ok(())
            }
            Command::ListArchive => {
                self.expect_args(command, args, 1, 1)?;
                let names = list_archive_contents(&self.navigator.resolve(&args[0]))?;
                writeln!(out, "Contents of {}:\n", args[0])?;
                write!(out, "{}", display::numbered(&names))?;
                Ok(())
            }
            Command::Bookmark => self.cmd_bookmark(args, out),
            Command::TrashList => {
                self.expect_args(command, args, 0, 0)?;
                let entries = self.trash.entries()?;
                write!(out, "{}", self.display.trash_entries(&entries))?;
                Ok(())
            }
            Command::Restore => {
                self.expect_args(command, args, 1, 1)?;
                let restored = self.trash.restore_from_trash(OsStr::new(&args[0]))?;
                writeln!(out, "Restored to {}", restored.display())?;
                Ok(())
            }
            Command::EmptyTrash => {
                self.expect_args(command, args, 0, 0)?;
                self.trash.empty_trash()?;
                writeln!(out, "Trash emptied")?;
                Ok(())
            }
            Command::Log => {
                self.expect_args(command, args, 0, 1)?;
                let n = match args.first() {
                    Some(raw) => parse_count(raw)?,
                    None => DEFAULT_LOG_ENTRIES,
                };
                let entries = self.journal.recent(n);
                writeln!(out, "Operation journal (last {}):\n", entries.len())?;
                for entry in entries {
                    writeln!(out, "{}", self.display.journal_entry(entry))?;
                }
                Ok(())
            }
            Command::Exit => {
                self.running = false;
                Ok(())
            }
        }
    }

    fn expect_args(&self, command: Command, args: &[String], min: usize, max: usize) -> CoreResult<()> {
        if (min..=max).contains(&args.len()) {
            return Ok(());
        }
        let usage = self
            .registry
            .descriptor_for(command)
            .map_or("", |d| d.usage);
        Err(CoreError::InvalidArgument(format!("usage: {usage}")))
    }

    fn cmd_help<W: Write>(&self, args: &[String], out: &mut W) -> CoreResult<()> {
        self.expect_args(Command::Help, args, 0, 1)?;
        match args.first() {
            None => write!(out, "{}", display::help(&self.registry))?,
            Some(name) => {
                let descriptor = self
                    .registry
                    .find(name)
                    .and_then(|c| self.registry.descriptor_for(c))
                    .ok_or_else(|| self.unknown_command(name))?;
                writeln!(out, "{}\n  {}", descriptor.usage, descriptor.description)?;
            }
        }
        Ok(())
    }

    fn cmd_list<W: Write>(&self, out: &mut W) -> CoreResult<()> {
        let mut entries = self.navigator.list_directory()?;
        if !self.config.general.dirs_first {
            entries = sort_entries(&entries, SortField::Name, SortDirection::Ascending, false);
        }
        let entries = apply_filter(&entries, &self.filter)?;
        write!(
            out,
            "{}",
            self.display.listing(self.navigator.current_dir(), &entries)
        )?;
        if !self.filter.is_passthrough() {
            writeln!(out, "(filter active; 'filter' without arguments resets)")?;
        }
        Ok(())
    }

    fn cmd_search<W: Write>(&self, command: Command, args: &[String], out: &mut W) -> CoreResult<()> {
        if args.is_empty() {
            return self.expect_args(command, args, 1, usize::MAX);
        }
        // Unquoted multi-word queries are joined back together.
        let query = args.join(" ");
        let root = self.navigator.current_dir();
        let max_size = self.config.search.max_content_file_size;
        let hits = match command {
            Command::Find => search_by_name(root, &query)?,
            Command::Grep => search_by_content(root, &query, max_size)?,
            _ => search_by_regex(root, &query, max_size)?,
        };
        write!(out, "{}", self.display.search_results(&query, &hits, root))?;
        Ok(())
    }

    fn cmd_cat<W: Write>(&self, args: &[String], out: &mut W) -> CoreResult<()> {
        self.expect_args(Command::Cat, args, 1, 3)?;
        let path = self.navigator.resolve(&args[0]);
        let start = args.get(1).map(|raw| parse_count(raw)).transpose()?.unwrap_or(0);
        let count = args
            .get(2)
            .map(|raw| parse_count(raw))
            .transpose()?
            .unwrap_or(self.config.viewer.default_lines);

        let view = view_text_file(&path, start, count, self.config.viewer.max_line_length)?;
        write!(out, "{}", self.display.text_view(&view))?;
        Ok(())
    }

    fn cmd_filter<W: Write>(&mut self, args: &[String], out: &mut W) -> CoreResult<()> {
        if args.is_empty() {
            self.filter = FilterOptions::with_hidden(self.config.general.show_hidden);
            writeln!(out, "Filter reset")?;
            return Ok(());
        }

        let mut options = parse_filter_args(args)?;
        if !args.iter().any(|a| a.starts_with("--type=")) {
            options.show_hidden = self.config.general.show_hidden;
        }
        self.filter = options;
        writeln!(out, "Filter applied")?;
        self.cmd_list(out)
    }

    fn cmd_archive<W: Write>(&self, args: &[String], out: &mut W) -> CoreResult<()> {
        if args.len() < 3 {
            return self.expect_args(Command::Archive, args, 3, usize::MAX);
        }
        let destination = self.navigator.resolve(&args[0]);
        let format = Some(args[1].as_str()).filter(|f| !f.eq_ignore_ascii_case("auto"));
        let sources: Vec<PathBuf> = args[2..].iter().map(|a| self.navigator.resolve(a)).collect();

        let format = archive_files(&sources, &destination, format)?;
        writeln!(out, "Created {format} archive {}", destination.display())?;
        Ok(())
    }

    fn cmd_bookmark<W: Write>(&mut self, args: &[String], out: &mut W) -> CoreResult<()> {
        let usage = || {
            CoreError::InvalidArgument(
                "usage: bookmark add <name> [dir] | list | remove <name> | go <name>".to_string(),
            )
        };
        let (sub, rest) = args.split_first().ok_or_else(usage)?;

        match (sub.as_str(), rest) {
            ("add", [label]) | ("add", [label, _]) => {
                let dir = match rest.get(1) {
                    Some(path) => self.navigator.resolve(path),
                    None => self.navigator.current_dir().to_path_buf(),
                };
                self.bookmarks = self.bookmarks.add(label, &dir)?;
                self.save_bookmarks()?;
                writeln!(out, "Bookmark '{label}' -> {}", dir.display())?;
            }
            ("list", []) => {
                if self.bookmarks.is_empty() {
                    writeln!(out, "No bookmarks")?;
                }
                for (label, path) in self.bookmarks.iter() {
                    writeln!(out, "{label:<16} {}", path.display())?;
                }
            }
            ("remove", [label]) => {
                self.bookmarks = self.bookmarks.remove(label)?;
                self.save_bookmarks()?;
                writeln!(out, "Bookmark '{label}' removed")?;
            }
            ("go", [label]) => {
                let target = self.bookmarks.get(label)?.to_path_buf();
                let dir = self.navigator.go_to(&target)?;
                writeln!(out, "{}", dir.display())?;
            }
            _ => return Err(usage()),
        }
        Ok(())
    }

    fn save_bookmarks(&self) -> CoreResult<()> {
        match &self.bookmarks_path {
            Some(path) => self.bookmarks.save_to_file(path),
            None => Ok(()),
        }
    }
}

fn parse_count(raw: &str) -> CoreResult<usize> {
    raw.parse()
        .map_err(|_| CoreError::InvalidArgument(format!("expected a non-negative number, got '{raw}'")))
}
