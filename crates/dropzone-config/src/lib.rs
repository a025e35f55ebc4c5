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

//! Layered configuration for the dropzone dispatcher.
//!
//! Layout: `model.rs` (typed configuration and ignore/settle policies),
//! `defaults.rs` (built-in values), `loader.rs` (defaults → JSON file → env),
//! `validate.rs` (validation applied once before the config is frozen).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ConfigOverrides};
pub use model::{DispatcherConfig, IgnoreSet, LogSettings, SettlePolicy};
pub use validate::validate_config;
