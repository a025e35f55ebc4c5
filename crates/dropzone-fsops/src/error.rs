//! # Design
//!
//! - Constant-message errors for disposal and rename operations.
//! - Operation and path travel as context so failures are reproducible in tests.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while moving or removing dispatched files.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// A filesystem call failed.
    #[error("file operation failed")]
    Io {
        /// Step that failed, e.g. `disposal.archive`.
        operation: &'static str,
        /// Path the step operated on.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A name or directory was rejected before touching the filesystem.
    #[error("invalid file operation input")]
    InvalidInput {
        /// Argument that was rejected.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Underlying IO error kind, when the failure came from the filesystem.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::InvalidInput { .. } => None,
        }
    }
}
