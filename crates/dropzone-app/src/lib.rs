#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Dropzone application wiring: watcher, dispatcher, and process bootstrap.
//!
//! Layout: `bootstrap.rs` (startup and run modes), `cli.rs` (arguments),
//! `watcher.rs` (directory subscription), `dispatcher.rs` (per-file cycle),
//! `event.rs` (arrival events), `error.rs`.

/// Process bootstrap and run modes.
pub mod bootstrap;
/// Command-line arguments.
pub mod cli;
/// Per-file dispatch cycle.
pub mod dispatcher;
/// Fatal error types.
pub mod error;
/// File arrival events.
pub mod event;
/// Directory watching.
pub mod watcher;

pub use bootstrap::{EXIT_CYCLE_FAILED, RunOutcome, load_config, run_app, run_with};
pub use cli::{Cli, RunMode};
pub use dispatcher::{CycleFailure, CycleState, DispatchReport, Dispatcher};
pub use error::{AppError, AppResult};
pub use event::FileEvent;
pub use watcher::{Subscription, run_until, subscribe, watch};
