//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers built once at startup and shared read-only afterwards.
//! - Keeps IO and layering in `loader.rs`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Process-wide dispatcher configuration, immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Directory monitored for newly created files.
    pub watch_dir: PathBuf,
    /// Root directory the processing programs are resolved under.
    pub programs_root: PathBuf,
    /// Optional interpreter placed in front of the program path (e.g. `python`).
    pub interpreter: Option<String>,
    /// Optional extension appended to program paths (e.g. `py`).
    pub program_extension: Option<String>,
    /// Path fragments that never trigger a dispatch.
    pub ignore: IgnoreSet,
    /// Strategy used to wait for a writer to finish before renaming.
    pub settle: SettlePolicy,
    /// Name of the archive directory created next to the watched directory.
    pub archive_dir_name: String,
    /// Companies whose files are renamed to a canonical name before processing.
    pub canonical_companies: BTreeSet<String>,
    /// Numeric company identifiers from bill file names mapped to company codes.
    pub company_aliases: BTreeMap<String, String>,
    /// Capacity of the watcher → dispatcher channel.
    pub event_buffer: usize,
    /// Logging settings handed to telemetry initialisation.
    pub logging: LogSettings,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from(defaults::WATCH_DIR),
            programs_root: PathBuf::from(defaults::PROGRAMS_ROOT),
            interpreter: None,
            program_extension: None,
            ignore: IgnoreSet::default(),
            settle: SettlePolicy::default(),
            archive_dir_name: defaults::ARCHIVE_DIR_NAME.to_string(),
            canonical_companies: defaults::CANONICAL_COMPANIES
                .iter()
                .map(|company| (*company).to_string())
                .collect(),
            company_aliases: defaults::COMPANY_ALIASES
                .iter()
                .map(|(id, company)| ((*id).to_string(), (*company).to_string()))
                .collect(),
            event_buffer: defaults::EVENT_BUFFER,
            logging: LogSettings::default(),
        }
    }
}

impl DispatcherConfig {
    /// Archive directory used for files dispatched from `directory`.
    ///
    /// The archive is a sibling of `directory` once it is resolved to an
    /// absolute path, so `.` and `..` archive next to the directories they
    /// name. The filesystem root archives into a child of itself.
    #[must_use]
    pub fn archive_dir_for(&self, directory: &Path) -> PathBuf {
        let resolved = resolve_dir(directory);
        match resolved.parent() {
            Some(parent) => parent.join(&self.archive_dir_name),
            None => resolved.join(&self.archive_dir_name),
        }
    }
}

/// Absolute form of `directory`, following symlinks when it exists.
///
/// Falls back to a lexical cleanup of the absolute path so missing directories
/// still resolve `.` and `..` components.
fn resolve_dir(directory: &Path) -> PathBuf {
    if let Ok(canonical) = directory.canonicalize() {
        return canonical;
    }
    let Ok(absolute) = std::path::absolute(directory) else {
        return directory.to_path_buf();
    };
    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

/// Substrings of file names that must never trigger a dispatch.
///
/// Only the final path component is inspected, so the directories above a
/// file never cause it to be ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct IgnoreSet(Vec<String>);

impl IgnoreSet {
    /// Build an ignore set from the provided patterns, dropping blanks.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            patterns
                .into_iter()
                .map(Into::into)
                .filter(|pattern| !pattern.trim().is_empty())
                .collect(),
        )
    }

    /// Whether the file name of `path` contains any ignored fragment.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.0.iter().any(|pattern| name.contains(pattern.as_str()))
    }

    /// Configured patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.0
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(defaults::IGNORE_PATTERNS.iter().copied())
    }
}

/// How long to wait for a writer before acting on a freshly created file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SettlePolicy {
    /// Sleep for a fixed delay.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Poll the file size until two consecutive samples agree.
    SizeStable {
        /// Interval between samples in milliseconds.
        interval_ms: u64,
        /// Maximum number of samples before giving up and proceeding.
        attempts: u32,
    },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::Fixed {
            delay_ms: defaults::SETTLE_DELAY_MS,
        }
    }
}

impl SettlePolicy {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::SizeStable { .. } => "size_stable",
        }
    }
}

/// Logging settings resolved from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogSettings {
    /// Log level (`RUST_LOG` takes precedence when set).
    pub level: String,
    /// Output format (`json` or `pretty`); inferred from the build when unset.
    pub format: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}
