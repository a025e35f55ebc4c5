//! Validation helpers and parsing utilities for configuration values.

use std::path::{Component, Path};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{DispatcherConfig, SettlePolicy};

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming the first field that fails.
pub fn validate_config(config: &DispatcherConfig) -> ConfigResult<()> {
    ensure_path("watch_dir", &config.watch_dir)?;
    ensure_path("programs_root", &config.programs_root)?;
    validate_archive_name(&config.archive_dir_name)?;
    validate_settle(config.settle)?;

    if config.event_buffer == 0 {
        return Err(ConfigError::invalid(
            "event_buffer",
            "must_be_positive",
            Some("0".to_string()),
        ));
    }

    if let Some(extension) = &config.program_extension
        && (extension.is_empty() || extension.contains(['.', '/', '\\']))
    {
        return Err(ConfigError::invalid(
            "program_extension",
            "invalid_extension",
            Some(extension.clone()),
        ));
    }

    for company in config
        .canonical_companies
        .iter()
        .chain(config.company_aliases.values())
    {
        validate_company_code(company)?;
    }
    for id in config.company_aliases.keys() {
        if id.is_empty() || !id.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ConfigError::invalid(
                "company_aliases",
                "id_not_numeric",
                Some(id.clone()),
            ));
        }
    }

    if let Some(format) = &config.logging.format
        && !matches!(format.as_str(), "json" | "pretty")
    {
        return Err(ConfigError::invalid(
            "log_format",
            "unknown_format",
            Some(format.clone()),
        ));
    }

    Ok(())
}

/// Parse a millisecond count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an unsigned integer.
pub fn parse_millis(value: &str, field: &'static str) -> ConfigResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(field, "not_an_integer", Some(value.to_string())))
}

/// Split a comma-separated list, trimming entries and dropping blanks.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn ensure_path(field: &'static str, path: &Path) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::invalid(field, "empty", None));
    }
    Ok(())
}

fn validate_archive_name(name: &str) -> ConfigResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::invalid(
            "archive_dir_name",
            "must_be_single_component",
            Some(name.to_string()),
        )),
    }
}

fn validate_settle(policy: SettlePolicy) -> ConfigResult<()> {
    if let SettlePolicy::SizeStable {
        interval_ms,
        attempts,
    } = policy
    {
        if interval_ms == 0 {
            return Err(ConfigError::invalid(
                "settle.interval_ms",
                "must_be_positive",
                Some(interval_ms.to_string()),
            ));
        }
        if attempts < 2 {
            return Err(ConfigError::invalid(
                "settle.attempts",
                "needs_two_samples",
                Some(attempts.to_string()),
            ));
        }
    }
    Ok(())
}

fn validate_company_code(company: &str) -> ConfigResult<()> {
    let valid = company
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_lowercase())
        && company
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            "company_code",
            "must_be_lowercase_alphanumeric",
            Some(company.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&DispatcherConfig::default()).is_ok());
    }

    #[test]
    fn archive_name_must_be_a_single_component() {
        for bad in ["", "..", "a/b", "/abs"] {
            let config = DispatcherConfig {
                archive_dir_name: bad.to_string(),
                ..DispatcherConfig::default()
            };
            assert!(
                matches!(
                    validate_config(&config),
                    Err(ConfigError::InvalidField {
                        field: "archive_dir_name",
                        ..
                    })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn size_stable_requires_two_samples() {
        let config = DispatcherConfig {
            settle: SettlePolicy::SizeStable {
                interval_ms: 100,
                attempts: 1,
            },
            ..DispatcherConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidField {
                field: "settle.attempts",
                ..
            })
        ));
    }

    #[test]
    fn company_codes_must_be_lowercase() {
        let mut config = DispatcherConfig::default();
        config.canonical_companies.insert("HLAP".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidField {
                field: "company_code",
                ..
            })
        ));
    }

    #[test]
    fn alias_ids_must_be_numeric() {
        let mut config = DispatcherConfig::default();
        config
            .company_aliases
            .insert("4700x".to_string(), "hlap".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let mut config = DispatcherConfig::default();
        config.logging.format = Some("xml".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn parse_helpers_trim_input() -> ConfigResult<()> {
        assert_eq!(parse_millis(" 250 ", "settle.delay_ms")?, 250);
        assert!(parse_millis("-1", "settle.delay_ms").is_err());
        assert_eq!(parse_list(" a, ,b "), vec!["a".to_string(), "b".to_string()]);
        Ok(())
    }
}
