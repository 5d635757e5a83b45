//! Archive engine: create, extract and list zip and tar-family containers.
//!
//! Writing is driven by [`walk::SourceWalk`], which turns the user's sources
//! into relative `/`-separated member names. Reading goes through
//! [`reader::for_each_member`], which hides the container and compression
//! differences. Extraction funnels every member through a single
//! `unpack_member` step that validates the target with
//! [`sanitize::member_target`], so the traversal rules are the same for
//! every format.
//!
//! | Format    | Create | Extract / list |
//! |-----------|--------|----------------|
//! | `zip`     | yes    | yes            |
//! | `tar`     | yes    | yes            |
//! | `tar.gz`  | yes    | yes            |
//! | `tar.bz2` | no     | yes            |
//! | `tar.xz`  | yes    | yes            |

pub mod extract;
pub mod format;
pub mod reader;
pub mod sanitize;
pub mod walk;
pub mod writer;

pub use extract::{extract_archive, ExtractReport};
pub use format::ArchiveFormat;
pub use reader::{list_archive_contents, ArchiveMember, MemberKind};
pub use writer::archive_files;
