//! # Design
//!
//! - Constant-message errors; the offending name or pattern travels as context.
//! - Every variant exposes a machine-readable reason.

use thiserror::Error;

/// Result alias for classification operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors produced while classifying a filename.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The filename does not follow the naming convention.
    #[error("malformed filename")]
    MalformedFilename {
        /// Filename (or path) that failed to parse.
        name: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A built-in name pattern failed to compile.
    #[error("name pattern unavailable")]
    Pattern {
        /// Pattern source.
        pattern: &'static str,
        /// Compiler diagnostic.
        detail: String,
    },
}

impl RouteError {
    pub(crate) fn malformed(name: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedFilename {
            name: name.into(),
            reason,
        }
    }

    pub(crate) fn pattern(pattern: &'static str, err: &regex::Error) -> Self {
        Self::Pattern {
            pattern,
            detail: err.to_string(),
        }
    }

    /// Machine-readable reason for the failure.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MalformedFilename { reason, .. } => reason,
            Self::Pattern { .. } => "pattern_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_helper_keeps_context_out_of_message() {
        let err = RouteError::malformed("README", "missing_extension");
        assert_eq!(err.to_string(), "malformed filename");
        assert_eq!(err.reason(), "missing_extension");
        assert!(matches!(
            err,
            RouteError::MalformedFilename { ref name, .. } if name == "README"
        ));
    }
}
