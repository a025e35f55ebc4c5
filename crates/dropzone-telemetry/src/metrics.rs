//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters the dispatcher records per cycle.

use std::fmt;
use std::sync::Arc;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across the dispatcher.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

struct MetricsInner {
    registry: Registry,
    dispatch_cycles_total: IntCounterVec,
    program_invocations_total: IntCounterVec,
    disposals_total: IntCounterVec,
    renames_total: IntCounterVec,
    ignored_events_total: IntCounter,
}

/// Snapshot of the aggregate counters for shutdown reporting and tests.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Dispatch cycles that completed successfully.
    pub cycles_succeeded: u64,
    /// Dispatch cycles that failed and were archived.
    pub cycles_failed: u64,
    /// Files deleted after successful processing.
    pub files_deleted: u64,
    /// Files moved into the archive.
    pub files_archived: u64,
    /// Files that were already gone at disposal time.
    pub files_missing: u64,
    /// Watcher events discarded by the ignore set.
    pub ignored_events: u64,
}

const OUTCOME_SUCCEEDED: &str = "succeeded";
const OUTCOME_FAILED: &str = "failed";
const ACTION_DELETED: &str = "deleted";
const ACTION_ARCHIVED: &str = "archived";
const ACTION_MISSING: &str = "missing";

impl Metrics {
    /// Construct a new metrics registry with the dispatcher collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let dispatch_cycles_total = IntCounterVec::new(
            Opts::new("dispatch_cycles_total", "Dispatch cycles completed by outcome"),
            &["outcome"],
        )
        .map_err(|source| TelemetryError::collector("build", "dispatch_cycles_total", source))?;
        let program_invocations_total = IntCounterVec::new(
            Opts::new(
                "program_invocations_total",
                "Processing program invocations by program and outcome",
            ),
            &["program", "outcome"],
        )
        .map_err(|source| TelemetryError::collector("build", "program_invocations_total", source))?;
        let disposals_total = IntCounterVec::new(
            Opts::new("disposals_total", "Files disposed of by action"),
            &["action"],
        )
        .map_err(|source| TelemetryError::collector("build", "disposals_total", source))?;
        let renames_total = IntCounterVec::new(
            Opts::new("renames_total", "Canonical renames attempted by status"),
            &["status"],
        )
        .map_err(|source| TelemetryError::collector("build", "renames_total", source))?;
        let ignored_events_total = IntCounter::with_opts(Opts::new(
            "ignored_events_total",
            "Watcher events discarded by the ignore set",
        ))
        .map_err(|source| TelemetryError::collector("build", "ignored_events_total", source))?;

        register(&registry, "dispatch_cycles_total", &dispatch_cycles_total)?;
        register(
            &registry,
            "program_invocations_total",
            &program_invocations_total,
        )?;
        register(&registry, "disposals_total", &disposals_total)?;
        register(&registry, "renames_total", &renames_total)?;
        register(&registry, "ignored_events_total", &ignored_events_total)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                dispatch_cycles_total,
                program_invocations_total,
                disposals_total,
                renames_total,
                ignored_events_total,
            }),
        })
    }

    /// Record a finished dispatch cycle.
    pub fn inc_cycle(&self, succeeded: bool) {
        self.inner
            .dispatch_cycles_total
            .with_label_values(&[outcome_label(succeeded)])
            .inc();
    }

    /// Record a processing program invocation and its result.
    pub fn inc_invocation(&self, program: &str, succeeded: bool) {
        self.inner
            .program_invocations_total
            .with_label_values(&[program, outcome_label(succeeded)])
            .inc();
    }

    /// Record a disposal action (`deleted`, `archived`, or `missing`).
    pub fn inc_disposal(&self, action: &str) {
        self.inner
            .disposals_total
            .with_label_values(&[action])
            .inc();
    }

    /// Record a rename attempt.
    pub fn inc_rename(&self, succeeded: bool) {
        self.inner
            .renames_total
            .with_label_values(&[outcome_label(succeeded)])
            .inc();
    }

    /// Record a watcher event discarded by the ignore set.
    pub fn inc_ignored(&self) {
        self.inner.ignored_events_total.inc();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = String::new();
        encoder
            .encode_utf8(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::Render { source })?;
        Ok(buffer)
    }

    /// Take a point-in-time snapshot of the aggregate counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let outcome = |label: &str| {
            self.inner
                .dispatch_cycles_total
                .with_label_values(&[label])
                .get()
        };
        let disposal = |label: &str| self.inner.disposals_total.with_label_values(&[label]).get();
        MetricsSnapshot {
            cycles_succeeded: outcome(OUTCOME_SUCCEEDED),
            cycles_failed: outcome(OUTCOME_FAILED),
            files_deleted: disposal(ACTION_DELETED),
            files_archived: disposal(ACTION_ARCHIVED),
            files_missing: disposal(ACTION_MISSING),
            ignored_events: self.inner.ignored_events_total.get(),
        }
    }
}

const fn outcome_label(succeeded: bool) -> &'static str {
    if succeeded {
        OUTCOME_SUCCEEDED
    } else {
        OUTCOME_FAILED
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::collector("register", name, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_cycle(true);
        metrics.inc_cycle(false);
        metrics.inc_cycle(true);
        metrics.inc_invocation("dupes_sorting/sort_multiples", true);
        metrics.inc_invocation("pdf_bill_indexing/hlap_pdf_idx", false);
        metrics.inc_disposal("deleted");
        metrics.inc_disposal("archived");
        metrics.inc_disposal("missing");
        metrics.inc_rename(false);
        metrics.inc_ignored();
        metrics.inc_ignored();

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                cycles_succeeded: 2,
                cycles_failed: 1,
                files_deleted: 1,
                files_archived: 1,
                files_missing: 1,
                ignored_events: 2,
            }
        );

        let rendered = metrics.render()?;
        assert!(rendered.contains("dispatch_cycles_total"));
        assert!(rendered.contains("program_invocations_total"));
        assert!(rendered.contains("renames_total"));
        assert!(rendered.contains("ignored_events_total 2"));
        Ok(())
    }
}
