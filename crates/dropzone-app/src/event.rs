//! File arrival events.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A file that arrived in the watched directory, or was named on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEvent {
    /// Path as reported by the event source.
    pub path: PathBuf,
    /// When the event was observed.
    pub created_at: DateTime<Utc>,
    /// Identifier correlating every log line of the resulting dispatch cycle.
    pub cycle_id: Uuid,
}

impl FileEvent {
    /// Event for `path` observed now.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            created_at: Utc::now(),
            cycle_id: Uuid::new_v4(),
        }
    }

    /// Path the event refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
