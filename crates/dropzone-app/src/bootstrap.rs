//! Process bootstrap: configuration, telemetry, and the selected run mode.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dropzone_config::{ConfigLoader, ConfigOverrides, DispatcherConfig};
use dropzone_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics, init_logging};
use tracing::{debug, info, warn};

use crate::cli::{Cli, RunMode};
use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::{AppError, AppResult};
use crate::event::FileEvent;
use crate::watcher::watch;

/// Exit code for a one-shot dispatch whose cycle failed.
pub const EXIT_CYCLE_FAILED: u8 = 2;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The watcher stopped after running `cycles` dispatch cycles.
    Watched {
        /// Number of cycles run before shutdown.
        cycles: usize,
    },
    /// A single file was dispatched.
    Dispatched(DispatchReport),
}

impl RunOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Watched { .. } => 0,
            Self::Dispatched(report) if report.succeeded() => 0,
            Self::Dispatched(_) => EXIT_CYCLE_FAILED,
        }
    }
}

/// Entry point for the dispatcher boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, telemetry, or the watch subscription
/// cannot be set up.
pub async fn run_app(cli: Cli) -> AppResult<RunOutcome> {
    let config = load_config(&cli)?;
    let logging = LoggingConfig {
        level: &config.logging.level,
        format: LogFormat::from_setting(config.logging.format.as_deref()),
        ..LoggingConfig::default()
    };
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let mode = cli.mode();
    let _context = GlobalContextGuard::new(match mode {
        RunMode::Once(_) => "once",
        RunMode::Watch => "watch",
    });
    info!(
        watch_dir = %config.watch_dir.display(),
        programs_root = %config.programs_root.display(),
        settle = config.settle.as_str(),
        "dropzone starting"
    );

    let metrics = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let config = Arc::new(config);
    let dispatcher = Dispatcher::new(Arc::clone(&config), metrics.clone());

    let outcome = run_with(mode, &config, &dispatcher, shutdown_signal()).await?;

    match metrics.render() {
        Ok(text) => debug!(metrics = %text, "final counters"),
        Err(err) => warn!(error = %err, "failed to render metrics"),
    }
    Ok(outcome)
}

/// Load configuration from defaults, the optional file, the environment, and
/// the command line.
///
/// # Errors
///
/// Returns [`AppError::Config`] when loading or validation fails.
pub fn load_config(cli: &Cli) -> AppResult<DispatcherConfig> {
    let mut loader = ConfigLoader::new().with_overrides(ConfigOverrides {
        watch_dir: cli.dir.clone(),
    });
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader
        .load()
        .map_err(|err| AppError::config("config.load", err))
}

/// Run `mode` with injected dependencies.
///
/// # Errors
///
/// Returns [`AppError::WatchSubscription`] when watching and the directory
/// cannot be subscribed to.
pub async fn run_with<F>(
    mode: RunMode,
    config: &DispatcherConfig,
    dispatcher: &Dispatcher,
    shutdown: F,
) -> AppResult<RunOutcome>
where
    F: Future<Output = ()>,
{
    match mode {
        RunMode::Once(file) => {
            let report = dispatcher.dispatch(FileEvent::new(file)).await;
            Ok(RunOutcome::Dispatched(report))
        }
        RunMode::Watch => {
            let dir = resolve_watch_dir(&config.watch_dir);
            let cycles = watch(&dir, config, dispatcher, shutdown).await?;
            Ok(RunOutcome::Watched { cycles })
        }
    }
}

/// Absolute form of `dir` when it exists; missing directories are reported by
/// the subscription itself.
fn resolve_watch_dir(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
