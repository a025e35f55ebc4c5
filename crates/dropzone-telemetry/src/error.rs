//! Error types for telemetry operations.
//!
//! # Design
//! - Constant messages; the metric name and failing step travel as context.

use prometheus::Error as PrometheusError;
use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing logging or maintaining metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber is already installed or could not be set.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// A counter could not be built or registered.
    #[error("metrics collector unavailable")]
    Collector {
        /// Step that failed (`build` or `register`).
        operation: &'static str,
        /// Metric name.
        name: &'static str,
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
    /// The text exposition could not be produced.
    #[error("failed to render metrics")]
    Render {
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
}

impl TelemetryError {
    pub(crate) const fn collector(
        operation: &'static str,
        name: &'static str,
        source: PrometheusError,
    ) -> Self {
        Self::Collector {
            operation,
            name,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn collector_errors_keep_name_out_of_message() {
        let err = TelemetryError::collector(
            "register",
            "dispatch_cycles_total",
            PrometheusError::AlreadyReg,
        );
        assert_eq!(err.to_string(), "metrics collector unavailable");
        assert!(err.source().is_some());
        assert!(matches!(
            err,
            TelemetryError::Collector {
                operation: "register",
                name: "dispatch_cycles_total",
                ..
            }
        ));
    }

    #[test]
    fn render_errors_expose_their_source() {
        let err = TelemetryError::Render {
            source: PrometheusError::Msg("encode".to_string()),
        };
        assert_eq!(err.to_string(), "failed to render metrics");
        assert!(err.source().is_some());
    }
}
