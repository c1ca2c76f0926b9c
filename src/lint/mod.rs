//! The lint engine (`spec.md` §4.4): a fixed, ordered battery of visitor
//! rules, each producing [`LintIssue`]s. Rules never fail the analysis --
//! invariant violations become report entries, per `spec.md` §7's
//! "lint rules do not throw".

mod alternation_overlap;
mod nested_quantifiers;
mod redundant_class;
mod useless_flags;

use crate::ast::Node;
use crate::pattern::Pattern;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Optimization,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    pub suggestion: Option<String>,
}

impl LintIssue {
    fn new(severity: Severity, code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            span,
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintStats {
    pub errors: usize,
    pub warnings: usize,
    pub optimizations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
    pub stats: LintStats,
}

/// Runs every rule, in `spec.md` §4.4's declaration order, against one AST,
/// then deduplicates by `(code, span)` -- the tie to one analysis
/// invocation `spec.md` §3 describes for `LintReport`.
pub fn analyze(pattern: &Pattern, root: &Node) -> LintReport {
    let mut issues = Vec::new();

    nested_quantifiers::check(root, &mut issues);
    alternation_overlap::check(root, &mut issues);
    useless_flags::check(pattern, root, &mut issues);
    redundant_class::check(root, &mut issues);

    dedup_stable(&mut issues);

    let mut stats = LintStats::default();
    for issue in &issues {
        match issue.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Optimization => stats.optimizations += 1,
        }
    }

    LintReport { issues, stats }
}

/// Removes later duplicates of an earlier `(code, span)` pair while keeping
/// the stable declaration-then-pre-order emission order of the survivors.
fn dedup_stable(issues: &mut Vec<LintIssue>) {
    let mut seen = std::collections::HashSet::new();
    issues.retain(|issue| seen.insert((issue.code, issue.span)));
}

pub use alternation_overlap::CODE as CODE_ALTERNATION_OVERLAP;
pub use nested_quantifiers::CODE as CODE_NESTED_QUANTIFIERS;
pub use redundant_class::CODE as CODE_REDUNDANT_CLASS;
pub use useless_flags::CODE as CODE_USELESS_FLAG;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn report_for(source: &str) -> LintReport {
        let pattern = Pattern::parse(source).unwrap();
        let parsed = parser::parse(&pattern.body).unwrap();
        analyze(&pattern, &parsed.root)
    }

    #[test]
    fn nested_quantifier_catastrophic_backtracking() {
        let report = report_for("/(a+)+/");
        assert!(report
            .issues
            .iter()
            .any(|i| i.message == "Nested quantifiers can cause catastrophic backtracking."));
    }

    #[test]
    fn useless_case_insensitive_flag() {
        let report = report_for("/[0-9]+/i");
        assert!(report.issues.iter().any(|i| i.message
            == "Flag 'i' is useless: the pattern contains no case-sensitive characters."));
    }

    #[test]
    fn alternation_prefix_overlap() {
        let report = report_for("/^(http|https|ftp):.+/i");
        assert!(report
            .issues
            .iter()
            .any(|i| i.message == "Alternation branches \"http\" and \"https\" overlap."));
    }

    #[test]
    fn stats_count_by_severity() {
        let report = report_for("/(a+)+/");
        assert_eq!(report.stats.warnings, report.issues.len());
    }
}
