//! Domain models for classification and routing.
//!
//! # Design
//! - Parsed names are immutable values derived from a filename string.
//! - Programs are a closed set; their script locations are fixed relative paths.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

/// Structured view of a filename that follows the naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFilename {
    /// Lowercase company code the file belongs to.
    pub company_code: String,
    /// File name as it currently exists on disk.
    pub base_name: String,
    /// Lowercase extension without the leading dot.
    pub file_type: String,
    /// Name the file must carry before it is processed.
    pub normalized_name: String,
    /// Directory the file lives in.
    pub source_dir: PathBuf,
    /// Billing cycle carried by bill file names.
    pub cycle: Option<u8>,
    /// First day of the billing or reporting month, when the name carries one.
    pub period: Option<NaiveDate>,
}

impl ParsedFilename {
    /// Whether the file must be renamed before any program sees it.
    #[must_use]
    pub fn needs_rename(&self) -> bool {
        self.base_name != self.normalized_name
    }

    /// Current location of the file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.source_dir.join(&self.base_name)
    }

    /// Location the file will have after a canonical rename.
    #[must_use]
    pub fn normalized_path(&self) -> PathBuf {
        self.source_dir.join(&self.normalized_name)
    }

    /// Indefinite article for the company code, used in log lines.
    #[must_use]
    pub fn article(&self) -> &'static str {
        match self.company_code.chars().next() {
            Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
            _ => "a",
        }
    }
}

/// Downstream processing programs the dispatcher can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Program {
    /// Indexes account numbers and pages in HLAP bill PDFs.
    PdfIndex,
    /// Converts HLAP non-PDF deliveries.
    HlapConvert,
    /// Sorts files that carry duplicate records.
    DupesSort,
    /// Generic per-company transform.
    Transform,
}

impl Program {
    /// Every program, in routing precedence order.
    pub const ALL: [Self; 4] = [
        Self::PdfIndex,
        Self::HlapConvert,
        Self::DupesSort,
        Self::Transform,
    ];

    /// Script location relative to the programs root, without extension.
    #[must_use]
    pub const fn relative_path(self) -> &'static str {
        match self {
            Self::PdfIndex => "pdf_bill_indexing/hlap_pdf_idx",
            Self::HlapConvert => "transforms/hlap_cnvrt",
            Self::DupesSort => "dupes_sorting/sort_multiples",
            Self::Transform => "transforms/transform_file",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relative_path())
    }
}

/// What a dispatch cycle does with a classified file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchDecision {
    /// Name of the routing rule that selected `program`.
    pub rule: &'static str,
    /// Program that processes the file once it carries its normalized name.
    pub program: Program,
    /// Whether this cycle renames the file instead of invoking `program`.
    pub needs_rename: bool,
}

impl DispatchDecision {
    /// Decide how to handle a classified file.
    #[must_use]
    pub fn for_file(parsed: &ParsedFilename) -> Self {
        let rule = crate::rules::matching_rule(&crate::rules::RouteInput {
            company_code: &parsed.company_code,
            base_name: &parsed.base_name,
            file_type: &parsed.file_type,
        });
        Self {
            rule: rule.name,
            program: rule.program,
            needs_rename: parsed.needs_rename(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(company: &str, base: &str, normalized: &str) -> ParsedFilename {
        ParsedFilename {
            company_code: company.to_string(),
            base_name: base.to_string(),
            file_type: "csv".to_string(),
            normalized_name: normalized.to_string(),
            source_dir: PathBuf::from("/in"),
            cycle: None,
            period: None,
        }
    }

    #[test]
    fn needs_rename_only_when_names_differ() {
        assert!(!parsed("acme", "a.csv", "a.csv").needs_rename());
        let renamed = parsed("hlap", "hlap bills.csv", "hlap_bills.csv");
        assert!(renamed.needs_rename());
        assert_eq!(renamed.path(), PathBuf::from("/in/hlap bills.csv"));
        assert_eq!(renamed.normalized_path(), PathBuf::from("/in/hlap_bills.csv"));
    }

    #[test]
    fn article_follows_leading_vowel() {
        assert_eq!(parsed("acme", "a.csv", "a.csv").article(), "an");
        assert_eq!(parsed("draper", "a.csv", "a.csv").article(), "a");
    }

    #[test]
    fn program_paths_are_stable() {
        assert_eq!(
            Program::PdfIndex.to_string(),
            "pdf_bill_indexing/hlap_pdf_idx"
        );
        assert_eq!(Program::HlapConvert.relative_path(), "transforms/hlap_cnvrt");
        assert_eq!(
            Program::DupesSort.relative_path(),
            "dupes_sorting/sort_multiples"
        );
        assert_eq!(
            Program::Transform.relative_path(),
            "transforms/transform_file"
        );
    }

    #[test]
    fn decision_carries_rule_program_and_rename_flag() {
        let decision = DispatchDecision::for_file(&parsed(
            "acme",
            "acme_dupes_202401.csv",
            "acme_dupes_202401.csv",
        ));
        assert_eq!(decision.rule, "dupes");
        assert_eq!(decision.program, Program::DupesSort);
        assert!(!decision.needs_rename);

        let renamed =
            DispatchDecision::for_file(&parsed("hlap", "hlap bills.csv", "hlap_bills.csv"));
        assert_eq!(renamed.rule, "hlap_other");
        assert_eq!(renamed.program, Program::HlapConvert);
        assert!(renamed.needs_rename);
    }
}
