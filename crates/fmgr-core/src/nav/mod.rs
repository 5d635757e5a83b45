//! Navigation logic for fmgr.
//!
//! This module contains the [`navigator::Navigator`] that tracks the current
//! directory, navigation [`history::History`], [`bookmarks::Bookmarks`], and
//! entry [`filter`]ing/sorting.

pub mod bookmarks;
pub mod filter;
pub mod history;
pub mod navigator;
