//! Directory watching.
//!
//! # Design
//! - notify delivers events on its own thread; arrivals are filtered there and
//!   forwarded through a bounded channel so a slow dispatcher applies backpressure.
//! - Only arrivals count: creations and renames into the directory. Directories
//!   and ignored paths never reach the dispatcher.
//! - Cycles run one at a time; shutdown is observed between cycles so an
//!   in-flight cycle always completes.

use std::future::Future;
use std::path::{Path, PathBuf};

use dropzone_config::{DispatcherConfig, IgnoreSet};
use dropzone_telemetry::Metrics;
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::dispatcher::Dispatcher;
use crate::error::{AppError, AppResult};
use crate::event::FileEvent;

/// Live subscription to a directory; dropping it stops event delivery.
pub struct Subscription {
    _watcher: RecommendedWatcher,
    events: mpsc::Receiver<FileEvent>,
}

impl Subscription {
    /// Next arrival, or `None` once the subscription has shut down.
    pub async fn next_event(&mut self) -> Option<FileEvent> {
        self.events.recv().await
    }
}

/// Subscribe to arrivals in `dir` (non-recursive).
///
/// # Errors
///
/// Returns [`AppError::WatchSubscription`] when `dir` is not a directory or the
/// platform watcher cannot be installed.
pub fn subscribe(
    dir: &Path,
    ignore: IgnoreSet,
    buffer: usize,
    metrics: Metrics,
) -> AppResult<Subscription> {
    if !dir.is_dir() {
        return Err(AppError::watch(
            "watcher.subscribe",
            dir,
            notify::Error::path_not_found().add_path(dir.to_path_buf()),
        ));
    }

    let (tx, rx) = mpsc::channel(buffer.max(1));
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) => {
                for path in arrivals(&event) {
                    if ignore.matches(path) {
                        trace!(path = %path.display(), "ignored path");
                        metrics.inc_ignored();
                        continue;
                    }
                    if path.is_dir() {
                        continue;
                    }
                    if tx.blocking_send(FileEvent::new(path.clone())).is_err() {
                        return;
                    }
                }
            }
            Err(err) => warn!(error = %err, "watch backend reported an error"),
        }
    })
    .map_err(|err| AppError::watch("watcher.create", dir, err))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|err| AppError::watch("watcher.watch", dir, err))?;
    info!(directory = %dir.display(), "watching");

    Ok(Subscription {
        _watcher: watcher,
        events: rx,
    })
}

/// Watch `dir` and dispatch every arrival until `shutdown` resolves.
///
/// Returns the number of cycles run.
///
/// # Errors
///
/// Returns [`AppError::WatchSubscription`] when the subscription cannot be
/// established; nothing is retried.
pub async fn watch<F>(
    dir: &Path,
    config: &DispatcherConfig,
    dispatcher: &Dispatcher,
    shutdown: F,
) -> AppResult<usize>
where
    F: Future<Output = ()>,
{
    let subscription = subscribe(
        dir,
        config.ignore.clone(),
        config.event_buffer,
        dispatcher.metrics().clone(),
    )?;
    Ok(run_until(subscription, dispatcher, shutdown).await)
}

/// Drain `subscription` into `dispatcher` until `shutdown` resolves.
pub async fn run_until<F>(mut subscription: Subscription, dispatcher: &Dispatcher, shutdown: F) -> usize
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut cycles = 0_usize;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(cycles, "shutdown requested; watcher stopping");
                break;
            }
            next = subscription.next_event() => {
                let Some(event) = next else {
                    warn!("watch subscription closed");
                    break;
                };
                let report = dispatcher.dispatch(event).await;
                debug!(
                    cycle_id = %report.cycle_id,
                    succeeded = report.succeeded(),
                    "cycle finished"
                );
                cycles += 1;
            }
        }
    }
    cycles
}

/// Paths an event introduces into the watched directory. Backends that pair
/// rename halves also emit a separate `To` event, so `Both` is skipped.
fn arrivals(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => &[],
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.as_slice()
        }
        _ => &[],
    }
}
