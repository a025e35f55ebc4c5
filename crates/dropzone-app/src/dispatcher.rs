//! Per-file dispatch cycle.
//!
//! # Design
//! - A cycle walks `Received → Classified → {Renaming | Invoking} → Disposed`
//!   and reaches `Disposed` exactly once, whatever happened before.
//! - Per-file failures are folded into a single failure flag and a report; none
//!   of them escapes as an error.
//! - Every log line of a cycle is emitted inside a span carrying its cycle id.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use dropzone_config::DispatcherConfig;
use dropzone_fsops::{Disposal, dispose, rename};
use dropzone_route::{
    Classifier, CommandBuilder, DispatchDecision, Invocation, ParsedFilename, Program,
};
use dropzone_telemetry::{Metrics, cycle_span};
use serde::Serialize;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use crate::event::FileEvent;

/// Stage of a dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    /// The event was accepted.
    Received,
    /// The name was parsed and a program chosen.
    Classified,
    /// The file is being renamed to its canonical name.
    Renaming,
    /// The selected program is running.
    Invoking,
    /// The file was deleted, archived, or found missing.
    Disposed,
}

/// Why a cycle counted as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleFailure {
    /// The file name does not follow the naming convention.
    MalformedFilename {
        /// Machine-readable parse failure.
        reason: &'static str,
    },
    /// The canonical rename could not be performed.
    RenameFailed,
    /// The program ran and exited unsuccessfully.
    ChildExited {
        /// Exit code, absent when the child was killed by a signal.
        code: Option<i32>,
    },
    /// The program could not be started.
    SpawnFailed,
}

/// Everything a cycle did, for logs, metrics, and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Identifier shared by every log line of the cycle.
    pub cycle_id: Uuid,
    /// Path named by the triggering event.
    pub file: PathBuf,
    /// Company the file was attributed to, when classification succeeded.
    pub company_code: Option<String>,
    /// Routing rule that matched, when classification succeeded.
    pub rule: Option<&'static str>,
    /// Program that was invoked; absent for renaming and malformed cycles.
    pub program: Option<Program>,
    /// Stages visited, in order.
    pub states: Vec<CycleState>,
    /// Reason the cycle failed, if it did.
    pub failure: Option<CycleFailure>,
    /// Disposal result; absent when disposal itself failed.
    pub disposal: Option<Disposal>,
}

impl DispatchReport {
    fn received(event: &FileEvent) -> Self {
        Self {
            cycle_id: event.cycle_id,
            file: event.path.clone(),
            company_code: None,
            rule: None,
            program: None,
            states: vec![CycleState::Received],
            failure: None,
            disposal: None,
        }
    }

    fn enter(&mut self, state: CycleState) {
        self.states.push(state);
    }

    /// Whether processing succeeded; the file was deleted or had already gone.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Composes classification, renaming, program invocation, and disposal.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Arc<DispatcherConfig>,
    classifier: Classifier,
    commands: CommandBuilder,
    metrics: Metrics,
}

impl Dispatcher {
    /// Dispatcher driven by `config`, recording into `metrics`.
    #[must_use]
    pub fn new(config: Arc<DispatcherConfig>, metrics: Metrics) -> Self {
        let classifier = Classifier::from_config(&config);
        let commands = CommandBuilder::from_config(&config);
        Self {
            config,
            classifier,
            commands,
            metrics,
        }
    }

    /// Counters updated by this dispatcher.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run one full cycle for `event`.
    pub async fn dispatch(&self, event: FileEvent) -> DispatchReport {
        let span = cycle_span(event.cycle_id, &event.path.to_string_lossy());
        let report = self.run_cycle(&event).instrument(span).await;
        self.metrics.inc_cycle(report.succeeded());
        report
    }

    async fn run_cycle(&self, event: &FileEvent) -> DispatchReport {
        let mut report = DispatchReport::received(event);
        let default_dir = self.config.watch_dir.as_path();

        let (name, directory) = match self.classifier.classify(&event.path, default_dir) {
            Ok(parsed) => {
                report.enter(CycleState::Classified);
                report.company_code = Some(parsed.company_code.clone());
                log_classification(&parsed);

                let decision = DispatchDecision::for_file(&parsed);
                report.rule = Some(decision.rule);
                info!(
                    rule = decision.rule,
                    program = %decision.program,
                    needs_rename = decision.needs_rename,
                    "routed"
                );
                report.failure = if decision.needs_rename {
                    report.enter(CycleState::Renaming);
                    self.rename_stage(&parsed).await
                } else {
                    report.enter(CycleState::Invoking);
                    report.program = Some(decision.program);
                    self.invoke_stage(&parsed, decision.program).await
                };
                (Some(parsed.base_name), parsed.source_dir)
            }
            Err(err) => {
                warn!(error = %err, reason = err.reason(), "file name outside naming convention");
                report.failure = Some(CycleFailure::MalformedFilename {
                    reason: err.reason(),
                });
                locate(&event.path, default_dir)
            }
        };

        report.disposal = self.dispose_stage(name.as_deref(), report.failure.is_some(), &directory);
        report.enter(CycleState::Disposed);
        report
    }

    async fn rename_stage(&self, parsed: &ParsedFilename) -> Option<CycleFailure> {
        info!(
            from = %parsed.path().display(),
            to = %parsed.normalized_path().display(),
            "renaming file"
        );
        let renamed = rename(
            &parsed.base_name,
            &parsed.normalized_name,
            &parsed.source_dir,
            &self.config.settle,
        )
        .await;
        self.metrics.inc_rename(renamed);
        (!renamed).then_some(CycleFailure::RenameFailed)
    }

    async fn invoke_stage(&self, parsed: &ParsedFilename, program: Program) -> Option<CycleFailure> {
        let invocation = self.commands.build(
            program,
            &parsed.company_code,
            &parsed.file_type,
            &parsed.base_name,
            &parsed.source_dir,
        );
        debug!(command = %invocation, "invoking");

        let failure = match run_program(&invocation).await {
            Ok(status) if status.success() => {
                info!(program = %program, "program completed");
                None
            }
            Ok(status) => {
                warn!(program = %program, code = ?status.code(), "program failed");
                Some(CycleFailure::ChildExited {
                    code: status.code(),
                })
            }
            Err(err) => {
                error!(program = %program, error = %err, "program could not be started");
                Some(CycleFailure::SpawnFailed)
            }
        };
        self.metrics
            .inc_invocation(program.relative_path(), failure.is_none());
        failure
    }

    fn dispose_stage(&self, name: Option<&str>, failed: bool, directory: &Path) -> Option<Disposal> {
        let Some(name) = name else {
            warn!(directory = %directory.display(), "event carries no usable file name");
            self.metrics.inc_disposal(Disposal::Missing.as_str());
            return Some(Disposal::Missing);
        };
        let archive_dir = self.config.archive_dir_for(directory);
        match dispose(name, failed, directory, &archive_dir) {
            Ok(disposal) => {
                info!(file = name, action = disposal.as_str(), "disposed");
                self.metrics.inc_disposal(disposal.as_str());
                Some(disposal)
            }
            Err(err) => {
                error!(file = name, error = %err, "disposal failed");
                None
            }
        }
    }
}

fn log_classification(parsed: &ParsedFilename) {
    info!(file = %parsed.base_name, "processing file");
    info!(
        company = %parsed.company_code,
        file_type = %parsed.file_type,
        "IDed as {} \"{}\" file of type \"{}\"",
        parsed.article(),
        parsed.company_code,
        parsed.file_type
    );
}

async fn run_program(invocation: &Invocation) -> io::Result<ExitStatus> {
    let mut command = tokio::process::Command::from(invocation.to_command());
    command.stdin(Stdio::null());
    command.status().await
}

/// File name and directory of an event path that failed classification.
fn locate(path: &Path, default_dir: &Path) -> (Option<String>, PathBuf) {
    let name = path
        .file_name()
        .and_then(OsStr::to_str)
        .map(str::to_string);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => default_dir.to_path_buf(),
    };
    (name, directory)
}
