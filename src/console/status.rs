//! On-screen status log for reported errors and lifecycle events.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Severity of a status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusLevel {
    /// Operation failed.
    Error,
    /// Operation failed but can be retried.
    Warn,
    /// Informational.
    Info,
}

/// Represents a single status entry.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    /// When the entry was recorded.
    pub timestamp: DateTime<Local>,
    /// Severity.
    pub level: StatusLevel,
    /// Text shown to the operator.
    pub message: String,
}

/// A fixed-capacity status buffer; the oldest entry is dropped when full.
#[derive(Debug, Clone)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
    capacity: usize,
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new(200)
    }
}

impl StatusLog {
    /// An empty log keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Appends an entry, evicting the oldest when full.
    pub fn push(&mut self, level: StatusLevel, message: impl Into<String>) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(StatusEntry {
            timestamp: Local::now(),
            level,
            message: message.into(),
        });
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &StatusEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&StatusEntry> {
        self.entries.back()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
