//! # Design
//!
//! - Only startup and subscription failures live here; per-file failures are
//!   folded into a dispatch report instead.
//! - Messages are constant; the failing step travels in `operation`.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Fatal errors that stop the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or validated.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Loader error.
        source: dropzone_config::ConfigError,
    },
    /// Logging or metrics could not be set up.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Telemetry error.
        source: dropzone_telemetry::TelemetryError,
    },
    /// The directory subscription could not be established.
    #[error("watch subscription failed")]
    WatchSubscription {
        /// Operation identifier.
        operation: &'static str,
        /// Directory being watched.
        path: PathBuf,
        /// Source notify error.
        source: notify::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: dropzone_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: dropzone_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) fn watch(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: notify::Error,
    ) -> Self {
        Self::WatchSubscription {
            operation,
            path: path.into(),
            source,
        }
    }
}
