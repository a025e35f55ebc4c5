//! Built-in configuration values.
//!
//! # Design
//! - Centralize defaults so the loader, validator, and tests agree on them.
//! - Keep time-based defaults explicit for auditability.

/// Directory watched when neither the CLI, env, nor a config file names one.
pub const WATCH_DIR: &str = "/var/lib/dropzone/incoming";
/// Root directory the processing programs are resolved under.
pub const PROGRAMS_ROOT: &str = "./src";
/// Name of the archive directory created next to the watched directory.
pub const ARCHIVE_DIR_NAME: &str = "archive";
/// Fixed settling delay applied before renaming a freshly created file.
pub const SETTLE_DELAY_MS: u64 = 5_000;
/// Capacity of the channel between the filesystem watcher and the dispatcher.
pub const EVENT_BUFFER: usize = 1_024;
/// Default log level when `RUST_LOG` is not provided.
pub const LOG_LEVEL: &str = "info";

/// File-name fragments that never trigger a dispatch (editor swap and backup
/// files, partial downloads).
pub const IGNORE_PATTERNS: &[&str] = &[".swp", ".tmp", "~", ".part", ".DS_Store"];

/// Companies whose files must carry a canonical name before they are processed.
pub const CANONICAL_COMPANIES: &[&str] = &["hlap"];

/// Numeric company identifiers used by bill file names, mapped to company codes.
pub const COMPANY_ALIASES: &[(&str, &str)] = &[("47001", "hlap")];
