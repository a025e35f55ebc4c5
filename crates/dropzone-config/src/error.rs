//! Error types for configuration operations.
//!
//! # Design
//! - Constant messages; the offending field and value travel as context.
//! - Preserve source errors without interpolating them into the message.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Reading the configuration file failed.
    #[error("failed to read configuration file")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the configuration file.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration file was not valid JSON for the expected layout.
    #[error("failed to parse configuration file")]
    Json {
        /// Path of the configuration file.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_errors_keep_constant_messages() {
        let invalid = ConfigError::invalid("watch_dir", "empty", Some(String::new()));
        assert_eq!(invalid.to_string(), "invalid configuration field");

        let io_err = ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("dropzone.json"),
            source: io::Error::other("io"),
        };
        assert_eq!(io_err.to_string(), "failed to read configuration file");
        assert!(io_err.source().is_some());

        let Err(json) = serde_json::from_str::<serde_json::Value>("{") else {
            panic!("expected invalid json");
        };
        let json_err = ConfigError::Json {
            path: PathBuf::from("dropzone.json"),
            source: json,
        };
        assert_eq!(json_err.to_string(), "failed to parse configuration file");
        assert!(json_err.source().is_some());
    }
}
