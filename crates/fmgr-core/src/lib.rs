//! fmgr core library: UI-agnostic file manager logic.
//!
//! `fmgr-core` provides the types and operations behind the `fmgr` shell.
//! It does no terminal I/O, so every operation can be driven and tested
//! directly.
//!
//! # Modules
//!
//! - [`fs`]: file system abstractions: [`FileEntry`], directory reading, file operations, text viewing, permissions.
//! - [`trash`]: recoverable deletion behind the [`TrashCan`] trait (freedesktop, macOS and Windows layouts).
//! - [`archive`]: zip / tar / tar.gz / tar.bz2 / tar.xz creation, listing and traversal-safe extraction.
//! - [`nav`]: current directory, history, bookmarks, sorting and filtering.
//! - [`search`]: recursive search by name, text and regular expression.
//! - [`journal`]: in-memory journal of the operations performed in a session.
//! - [`command`]: the shell's command catalogue and command-line tokenizer.
//! - [`config`]: user-facing configuration (TOML-based settings).
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod archive;
pub mod command;
pub mod config;
pub mod error;
pub mod fs;
pub mod journal;
pub mod nav;
pub mod search;
pub mod trash;

pub use archive::{
    archive_files, extract_archive, list_archive_contents, ArchiveFormat, ExtractReport,
};
pub use command::{tokenize, Command, CommandCategory, CommandDescriptor, CommandRegistry};
pub use config::settings::Config;
pub use error::{CoreError, CoreResult};
pub use fs::entry::FileEntry;
pub use fs::ops::{
    copy_file, create_directory, create_file, delete_directory, file_info, move_file,
    read_directory, FileInfo,
};
pub use fs::viewer::{view_text_file, TextView};
pub use journal::{Journal, JournalEntry, JournalLevel};
pub use nav::bookmarks::Bookmarks;
pub use nav::filter::{apply as apply_filter, parse_filter_args, sort_entries, FilterOptions};
pub use nav::filter::{SortDirection, SortField};
pub use nav::history::History;
pub use nav::navigator::Navigator;
pub use search::{search_by_content, search_by_name, search_by_regex};
pub use trash::{platform_trash, TrashCan, TrashEntry, TrashKind};
