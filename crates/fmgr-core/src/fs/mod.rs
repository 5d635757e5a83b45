//! File system abstractions for fmgr.
//!
//! This module provides the core types for representing file entries
//! ([`entry::FileEntry`]), basic create/copy/move/delete operations
//! ([`ops`]), paged text viewing ([`viewer::TextView`]) and permission
//! handling ([`permissions`]).

pub mod entry;
pub mod ops;
pub mod permissions;
pub mod viewer;

pub use ops::FileInfo;
pub use viewer::TextView;
