//! Layered configuration loading.
//!
//! # Design
//! - Layers apply in order: built-in defaults, optional JSON file, environment,
//!   then explicit overrides from the command line.
//! - Environment access is injected so tests never touch the process env.
//! - The merged result is validated once and returned by value; callers share it
//!   behind an `Arc` and never mutate it.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{DispatcherConfig, IgnoreSet, SettlePolicy};
use crate::validate::{parse_list, parse_millis, validate_config};

/// Environment variable naming the watched directory.
pub const ENV_WATCH_DIR: &str = "DROPZONE_WATCH_DIR";
/// Environment variable naming the programs root.
pub const ENV_PROGRAMS_ROOT: &str = "DROPZONE_PROGRAMS_ROOT";
/// Environment variable naming the program interpreter.
pub const ENV_INTERPRETER: &str = "DROPZONE_INTERPRETER";
/// Environment variable carrying comma-separated ignore patterns.
pub const ENV_IGNORE: &str = "DROPZONE_IGNORE";
/// Environment variable carrying the fixed settling delay in milliseconds.
pub const ENV_SETTLE_MS: &str = "DROPZONE_SETTLE_MS";
/// Environment variable carrying the log level.
pub const ENV_LOG_LEVEL: &str = "DROPZONE_LOG_LEVEL";
/// Environment variable carrying the log format.
pub const ENV_LOG_FORMAT: &str = "DROPZONE_LOG_FORMAT";

/// Values supplied on the command line; they win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Directory to watch instead of the configured one.
    pub watch_dir: Option<PathBuf>,
}

/// Builds a [`DispatcherConfig`] from defaults, an optional file, and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Loader with no config file and no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the given JSON file as the second layer.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Apply command-line overrides as the final layer.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if the
    /// merged configuration fails validation.
    pub fn load(&self) -> ConfigResult<DispatcherConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Load configuration resolving environment variables through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if the
    /// merged configuration fails validation.
    pub fn load_with_env<F>(&self, env: F) -> ConfigResult<DispatcherConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DispatcherConfig::default();

        if let Some(path) = &self.file {
            let layer = read_file_layer(path)?;
            layer.apply(&mut config);
            debug!(path = %path.display(), "applied configuration file");
        }

        apply_env(&mut config, &env)?;

        if let Some(dir) = &self.overrides.watch_dir {
            config.watch_dir.clone_from(dir);
        }

        validate_config(&config)?;
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayer {
    watch_dir: Option<PathBuf>,
    programs_root: Option<PathBuf>,
    interpreter: Option<String>,
    program_extension: Option<String>,
    ignore: Option<Vec<String>>,
    settle: Option<SettlePolicy>,
    archive_dir_name: Option<String>,
    canonical_companies: Option<BTreeSet<String>>,
    company_aliases: Option<BTreeMap<String, String>>,
    event_buffer: Option<usize>,
    log_level: Option<String>,
    log_format: Option<String>,
}

impl FileLayer {
    fn apply(self, config: &mut DispatcherConfig) {
        if let Some(value) = self.watch_dir {
            config.watch_dir = value;
        }
        if let Some(value) = self.programs_root {
            config.programs_root = value;
        }
        if self.interpreter.is_some() {
            config.interpreter = self.interpreter;
        }
        if self.program_extension.is_some() {
            config.program_extension = self.program_extension;
        }
        if let Some(patterns) = self.ignore {
            config.ignore = IgnoreSet::new(patterns);
        }
        if let Some(value) = self.settle {
            config.settle = value;
        }
        if let Some(value) = self.archive_dir_name {
            config.archive_dir_name = value;
        }
        if let Some(value) = self.canonical_companies {
            config.canonical_companies = value;
        }
        if let Some(value) = self.company_aliases {
            config.company_aliases = value;
        }
        if let Some(value) = self.event_buffer {
            config.event_buffer = value;
        }
        if let Some(value) = self.log_level {
            config.logging.level = value;
        }
        if self.log_format.is_some() {
            config.logging.format = self.log_format;
        }
    }
}

fn read_file_layer(path: &Path) -> ConfigResult<FileLayer> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read_file",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env<F>(config: &mut DispatcherConfig, env: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(ENV_WATCH_DIR) {
        config.watch_dir = PathBuf::from(value);
    }
    if let Some(value) = env(ENV_PROGRAMS_ROOT) {
        config.programs_root = PathBuf::from(value);
    }
    if let Some(value) = env(ENV_INTERPRETER) {
        config.interpreter = Some(value).filter(|value| !value.trim().is_empty());
    }
    if let Some(value) = env(ENV_IGNORE) {
        config.ignore = IgnoreSet::new(parse_list(&value));
    }
    if let Some(value) = env(ENV_SETTLE_MS) {
        config.settle = SettlePolicy::Fixed {
            delay_ms: parse_millis(&value, "settle.delay_ms")?,
        };
    }
    if let Some(value) = env(ENV_LOG_LEVEL) {
        config.logging.level = value;
    }
    if let Some(value) = env(ENV_LOG_FORMAT) {
        config.logging.format = Some(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_load_without_sources() -> ConfigResult<()> {
        let config = ConfigLoader::new().load_with_env(|_| None)?;
        assert_eq!(config, DispatcherConfig::default());
        Ok(())
    }

    #[test]
    fn env_layer_overrides_defaults() -> ConfigResult<()> {
        let config = ConfigLoader::new().load_with_env(env_from(&[
            (ENV_WATCH_DIR, "/data/in"),
            (ENV_INTERPRETER, "python3"),
            (ENV_IGNORE, ".swp, .lock ,"),
            (ENV_SETTLE_MS, "1500"),
            (ENV_LOG_FORMAT, "json"),
        ]))?;
        assert_eq!(config.watch_dir, PathBuf::from("/data/in"));
        assert_eq!(config.interpreter.as_deref(), Some("python3"));
        assert_eq!(
            config.ignore.patterns(),
            [".swp".to_string(), ".lock".to_string()]
        );
        assert_eq!(config.settle, SettlePolicy::Fixed { delay_ms: 1_500 });
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        Ok(())
    }

    #[test]
    fn overrides_win_over_env() -> ConfigResult<()> {
        let config = ConfigLoader::new()
            .with_overrides(ConfigOverrides {
                watch_dir: Some(PathBuf::from("/cli/dir")),
            })
            .load_with_env(env_from(&[(ENV_WATCH_DIR, "/env/dir")]))?;
        assert_eq!(config.watch_dir, PathBuf::from("/cli/dir"));
        Ok(())
    }

    #[test]
    fn invalid_settle_value_is_rejected() {
        let result =
            ConfigLoader::new().load_with_env(env_from(&[(ENV_SETTLE_MS, "five seconds")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField {
                field: "settle.delay_ms",
                ..
            })
        ));
    }

    #[test]
    fn empty_watch_dir_fails_validation() {
        let result = ConfigLoader::new().load_with_env(env_from(&[(ENV_WATCH_DIR, "")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField {
                field: "watch_dir",
                ..
            })
        ));
    }
}
