//! In-memory journal of the operations performed in a session.
//!
//! The journal backs the `log` command. It keeps the newest `max_entries`
//! records and forwards each one to `tracing` so the log file has the same
//! history.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};

/// Severity of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JournalLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for JournalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One recorded operation.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub timestamp: DateTime<Local>,
    pub level: JournalLevel,
    /// Command name, e.g. `mkdir`.
    pub operation: String,
    /// Path the operation acted on; empty when there is none.
    pub path: String,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    max_entries: usize,
}

impl Journal {
    /// Creates an empty journal keeping at most `max_entries` records.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Appends an entry, dropping the oldest one when full.
    pub fn record(
        &mut self,
        level: JournalLevel,
        operation: &str,
        path: &str,
        message: &str,
        error: Option<&dyn std::error::Error>,
    ) {
        let entry = JournalEntry {
            timestamp: Local::now(),
            level,
            operation: operation.to_string(),
            path: path.to_string(),
            message: message.to_string(),
            error: error.map(ToString::to_string),
        };
        mirror(&entry);

        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn info(&mut self, operation: &str, path: &str, message: &str) {
        self.record(JournalLevel::Info, operation, path, message, None);
    }

    pub fn error(&mut self, operation: &str, path: &str, message: &str, error: &dyn std::error::Error) {
        self.record(JournalLevel::Error, operation, path, message, Some(error));
    }

    /// The newest `n` entries, oldest first. `0` returns everything.
    pub fn recent(&self, n: usize) -> Vec<&JournalEntry> {
        let skip = if n == 0 {
            0
        } else {
            self.entries.len().saturating_sub(n)
        };
        self.entries.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn mirror(entry: &JournalEntry) {
    let error = entry.error.as_deref().unwrap_or_default();
    match entry.level {
        JournalLevel::Debug => tracing::debug!(
            operation = %entry.operation, path = %entry.path, "{}", entry.message
        ),
        JournalLevel::Info => tracing::info!(
            operation = %entry.operation, path = %entry.path, "{}", entry.message
        ),
        JournalLevel::Warning => tracing::warn!(
            operation = %entry.operation, path = %entry.path, error, "{}", entry.message
        ),
        JournalLevel::Error => tracing::error!(
            operation = %entry.operation, path = %entry.path, error, "{}", entry.message
        ),
    }
}
