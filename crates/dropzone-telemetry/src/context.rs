//! Span helpers for the process and for individual dispatch cycles.
//!
//! # Design
//! - The process span carries run mode and build SHA for every log line.
//! - Each dispatch cycle gets its own span keyed by a cycle identifier so the
//!   interleaved output of watcher, rename, and child process can be correlated.

use tracing::Span;
use tracing::span::EnteredSpan;
use uuid::Uuid;

use crate::init::build_sha;

/// Keeps the process span entered until dropped.
///
/// The guard is not `Send`; hold it on the thread that drives the runtime.
#[derive(Debug)]
pub struct GlobalContextGuard {
    _entered: EnteredSpan,
}

impl GlobalContextGuard {
    /// Enter a `dropzone` span tagged with `mode`.
    #[must_use]
    pub fn new(mode: &str) -> Self {
        let span = tracing::info_span!("dropzone", mode, build_sha = build_sha());
        Self {
            _entered: span.entered(),
        }
    }
}

/// Span covering one dispatch cycle for `file`.
#[must_use]
pub fn cycle_span(cycle_id: Uuid, file: &str) -> Span {
    tracing::info_span!("cycle", %cycle_id, file)
}
