//! Ordered routing table mapping classified files to processing programs.
//!
//! Rules are evaluated top to bottom and the first match wins. The last rule is
//! a catch-all, so routing is total.

use crate::model::Program;

const HLAP: &str = "hlap";
const PDF: &str = "pdf";
const DUPES_MARKER: &str = "dupes";

/// Fields a routing predicate may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RouteInput<'a> {
    /// Lowercase company code.
    pub company_code: &'a str,
    /// Current file name.
    pub base_name: &'a str,
    /// Lowercase extension.
    pub file_type: &'a str,
}

/// One entry of the routing table.
#[derive(Debug, Clone, Copy)]
pub struct RoutingRule {
    /// Short label recorded on each dispatch decision and logged with it.
    pub name: &'static str,
    /// Predicate deciding whether the rule applies.
    pub matches: fn(&RouteInput<'_>) -> bool,
    /// Program selected when the predicate holds.
    pub program: Program,
}

/// Routing table in precedence order.
pub const ROUTING_RULES: &[RoutingRule] = &[
    RoutingRule {
        name: "hlap_pdf",
        matches: is_hlap_pdf,
        program: Program::PdfIndex,
    },
    RoutingRule {
        name: "hlap_other",
        matches: is_hlap,
        program: Program::HlapConvert,
    },
    RoutingRule {
        name: "dupes",
        matches: mentions_dupes,
        program: Program::DupesSort,
    },
    RoutingRule {
        name: "fallback",
        matches: always,
        program: Program::Transform,
    },
];

/// Select the program for a file; total over all inputs.
#[must_use]
pub fn select_program(company_code: &str, base_name: &str, file_type: &str) -> Program {
    matching_rule(&RouteInput {
        company_code,
        base_name,
        file_type,
    })
    .program
}

/// First rule whose predicate holds for `input`.
#[must_use]
pub fn matching_rule(input: &RouteInput<'_>) -> &'static RoutingRule {
    ROUTING_RULES
        .iter()
        .find(|rule| (rule.matches)(input))
        .unwrap_or(&ROUTING_RULES[ROUTING_RULES.len() - 1])
}

fn is_hlap(input: &RouteInput<'_>) -> bool {
    input.company_code == HLAP
}

fn is_hlap_pdf(input: &RouteInput<'_>) -> bool {
    is_hlap(input) && input.file_type == PDF
}

fn mentions_dupes(input: &RouteInput<'_>) -> bool {
    input.base_name.to_lowercase().contains(DUPES_MARKER)
}

const fn always(_: &RouteInput<'_>) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hlap_routes_by_file_type() {
        for name in ["anything.pdf", "hlap_dupes.pdf", "B47001_02_201702_47001.pdf"] {
            assert_eq!(select_program("hlap", name, "pdf"), Program::PdfIndex);
        }
        for file_type in ["csv", "txt", "zip"] {
            assert_eq!(
                select_program("hlap", "hlap_dupes_202401.csv", file_type),
                Program::HlapConvert
            );
        }
    }

    #[test]
    fn dupes_marker_is_case_insensitive() {
        for company in ["acme", "draper", "elko"] {
            assert_eq!(
                select_program(company, "monthly_dupes_report.csv", "csv"),
                Program::DupesSort
            );
        }
        assert_eq!(
            select_program("acme", "ACME_DUPES.csv", "csv"),
            Program::DupesSort
        );
    }

    #[test]
    fn everything_else_uses_the_generic_transform() {
        assert_eq!(
            select_program("acme", "invoice.csv", "csv"),
            Program::Transform
        );
        assert_eq!(select_program("", "", ""), Program::Transform);
    }

    #[test]
    fn table_is_total_and_ends_with_fallback() {
        let last = ROUTING_RULES[ROUTING_RULES.len() - 1];
        assert_eq!(last.name, "fallback");
        assert_eq!(last.program, Program::Transform);

        let input = RouteInput {
            company_code: "zzz",
            base_name: "zzz.bin",
            file_type: "bin",
        };
        assert_eq!(matching_rule(&input).name, "fallback");
    }

    #[test]
    fn every_program_is_reachable() {
        let reached: Vec<Program> = ROUTING_RULES.iter().map(|rule| rule.program).collect();
        for program in Program::ALL {
            assert!(reached.contains(&program), "{program} unreachable");
        }
    }
}
