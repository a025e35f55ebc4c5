//! Filename classification.
//!
//! Two conventions are recognised:
//!
//! - Bill files: `B<id>_<cycle>_<yyyymm>_<id>.<ext>`, where both five-digit ids
//!   match and resolve to a company through the configured alias table.
//! - Everything else: the leading alphanumeric token of the stem is the company
//!   code; an optional trailing `_<yyyymm>` token carries the reporting month.
//!
//! Classification is pure. Names outside the convention are rejected rather
//! than guessed at.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dropzone_config::DispatcherConfig;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RouteError, RouteResult};
use crate::model::ParsedFilename;

const BILL_STEM_PATTERN: &str =
    r"^[Bb](?P<id>\d{5})_(?P<cycle>\d{2})_(?P<period>\d{6})_(?P<trailer>\d{5})$";

static BILL_STEM: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(BILL_STEM_PATTERN));

/// Parses filenames into [`ParsedFilename`] values using the configured company tables.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    canonical_companies: BTreeSet<String>,
    company_aliases: BTreeMap<String, String>,
}

impl Classifier {
    /// Build a classifier from the dispatcher configuration.
    #[must_use]
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            canonical_companies: config.canonical_companies.clone(),
            company_aliases: config.company_aliases.clone(),
        }
    }

    /// Classify `filename`.
    ///
    /// `filename` may be a bare name or a path; when it has no directory
    /// component the file is assumed to live in `default_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MalformedFilename`] when the name does not follow
    /// the convention.
    pub fn classify(&self, filename: &Path, default_dir: &Path) -> RouteResult<ParsedFilename> {
        let display = filename.to_string_lossy();
        let base_name = filename
            .file_name()
            .ok_or_else(|| RouteError::malformed(display.as_ref(), "missing_file_name"))?
            .to_str()
            .ok_or_else(|| RouteError::malformed(display.as_ref(), "not_utf8"))?
            .to_string();
        let source_dir = match filename.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => default_dir.to_path_buf(),
        };

        if base_name.starts_with('.') {
            return Err(RouteError::malformed(base_name, "hidden_file"));
        }

        let (stem, extension) = base_name
            .rsplit_once('.')
            .ok_or_else(|| RouteError::malformed(base_name.as_str(), "missing_extension"))?;
        if stem.trim().is_empty() {
            return Err(RouteError::malformed(base_name.as_str(), "empty_stem"));
        }
        if extension.is_empty() || !extension.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(RouteError::malformed(base_name.as_str(), "invalid_extension"));
        }
        let file_type = extension.to_ascii_lowercase();

        let (company_code, cycle, period) = match self.parse_bill_stem(stem, &base_name)? {
            Some(bill) => bill,
            None => {
                let company = company_token(stem)
                    .ok_or_else(|| RouteError::malformed(base_name.as_str(), "no_company_code"))?
                    .to_ascii_lowercase();
                (company, None, trailing_period(stem))
            }
        };

        let normalized_name = if self.canonical_companies.contains(&company_code) {
            canonical_name(&base_name)
        } else {
            base_name.clone()
        };

        Ok(ParsedFilename {
            company_code,
            base_name,
            file_type,
            normalized_name,
            source_dir,
            cycle,
            period,
        })
    }

    /// Classify a bare file name located in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MalformedFilename`] when the name does not follow
    /// the convention.
    pub fn classify_in(&self, name: &str, dir: &Path) -> RouteResult<ParsedFilename> {
        self.classify(&PathBuf::from(name), dir)
    }

    /// Recognise the bill convention. Returns `Ok(None)` when the stem is not a
    /// bill name or its id is not registered, so the generic rule applies.
    fn parse_bill_stem(
        &self,
        stem: &str,
        base_name: &str,
    ) -> RouteResult<Option<(String, Option<u8>, Option<NaiveDate>)>> {
        let pattern = BILL_STEM
            .as_ref()
            .map_err(|err| RouteError::pattern(BILL_STEM_PATTERN, err))?;
        let Some(captures) = pattern.captures(stem) else {
            return Ok(None);
        };
        let id = &captures["id"];
        if captures["trailer"] != *id {
            return Ok(None);
        }
        let Some(company) = self.company_aliases.get(id) else {
            return Ok(None);
        };
        let cycle = captures["cycle"]
            .parse::<u8>()
            .map_err(|_| RouteError::malformed(base_name, "invalid_cycle"))?;
        let period = parse_period(&captures["period"])
            .ok_or_else(|| RouteError::malformed(base_name, "invalid_period"))?;
        Ok(Some((company.clone(), Some(cycle), Some(period))))
    }
}

/// Canonical form of a file name: runs of whitespace and `-` in the stem
/// become a single `_`, and the extension is lowercased. Idempotent.
#[must_use]
pub fn canonical_name(base_name: &str) -> String {
    match base_name.rsplit_once('.') {
        Some((stem, extension)) => format!(
            "{}.{}",
            collapse_separators(stem),
            extension.to_ascii_lowercase()
        ),
        None => collapse_separators(base_name),
    }
}

fn collapse_separators(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut in_run = false;
    for ch in stem.chars() {
        if ch.is_whitespace() || ch == '-' {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Leading `[A-Za-z][A-Za-z0-9]*` token of `stem`.
fn company_token(stem: &str) -> Option<&str> {
    if !stem.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return None;
    }
    let end = stem
        .find(|ch: char| !ch.is_ascii_alphanumeric())
        .unwrap_or(stem.len());
    Some(&stem[..end])
}

fn trailing_period(stem: &str) -> Option<NaiveDate> {
    stem.rsplit('_')
        .next()
        .filter(|token| token.len() == 6 && token.chars().all(|ch| ch.is_ascii_digit()))
        .and_then(parse_period)
}

fn parse_period(value: &str) -> Option<NaiveDate> {
    let year = value.get(..4)?.parse::<i32>().ok()?;
    let month = value.get(4..6)?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}
