//! Recent activity log.
//!
//! Records course generations and saves, newest first, capped at
//! [`MAX_ACTIVITIES`] entries.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Maximum entries kept before pruning.
pub const MAX_ACTIVITIES: usize = 20;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Generate,
    Save,
}

/// One entry in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ActivityRecord {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Course title
    pub title: String,
    /// Epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create a record stamped now.
    pub fn new(kind: ActivityKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            timestamp: Utc::now(),
        }
    }

    /// Sentence used by list views.
    pub fn describe(&self) -> String {
        match self.kind {
            ActivityKind::Generate => format!("Generated course: \"{}\"", self.title),
            ActivityKind::Save => format!("Saved course: \"{}\"", self.title),
        }
    }
}

/// Bounded, newest-first log of activity records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: VecDeque<ActivityRecord>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Add a record at the front and prune the oldest beyond the cap.
    pub fn push(&mut self, record: ActivityRecord) {
        self.entries.push_front(record);

        while self.entries.len() > MAX_ACTIVITIES {
            self.entries.pop_back();
        }
    }

    /// Most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ActivityRecord> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries past the cap, e.g. after loading an oversized log from disk.
    pub fn truncate(&mut self) {
        self.entries.truncate(MAX_ACTIVITIES);
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
