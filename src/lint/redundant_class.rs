//! Redundant-class-element rule (`spec.md` §4.4): overlapping ranges inside
//! one character class, a range wholly covered by a shorthand already
//! present, and duplicate literals.

use std::collections::HashSet;

use crate::alphabet::Interval;
use crate::ast::{ClassPart, Node, NodeKind, ShorthandKind};

use super::{LintIssue, Severity};

pub const CODE: &str = "redundant-class";

const MESSAGE: &str = "Redundant elements detected in character class.";

pub fn check(root: &Node, issues: &mut Vec<LintIssue>) {
    walk(root, issues);
}

fn walk(node: &Node, issues: &mut Vec<LintIssue>) {
    if let NodeKind::CharClass { parts, .. } = &node.kind {
        if has_redundancy(parts) {
            issues.push(LintIssue::new(Severity::Optimization, CODE, MESSAGE, node.span));
        }
    }

    match &node.kind {
        NodeKind::Group { child, .. } | NodeKind::Assertion { child, .. } | NodeKind::Quantifier { child, .. } => {
            walk(child, issues)
        }
        NodeKind::Alternation { branches } => {
            for b in branches {
                walk(b, issues);
            }
        }
        NodeKind::Sequence(children) => {
            for c in children {
                walk(c, issues);
            }
        }
        NodeKind::Literal { .. }
        | NodeKind::CharClass { .. }
        | NodeKind::Anchor(_)
        | NodeKind::Backref(_)
        | NodeKind::Recursion(_) => {}
    }
}

fn has_redundancy(parts: &[ClassPart]) -> bool {
    let mut seen_literals = HashSet::new();
    for part in parts {
        if let ClassPart::Literal(c) = part {
            if !seen_literals.insert(*c) {
                return true;
            }
        }
    }

    let ranges: Vec<Interval> = parts
        .iter()
        .filter_map(|p| match p {
            ClassPart::Range(lo, hi) => Some(Interval::inclusive_range(*lo, *hi)),
            _ => None,
        })
        .collect();
    for i in 0..ranges.len() {
        for j in (i + 1)..ranges.len() {
            if ranges[i].overlaps(&ranges[j]) {
                return true;
            }
        }
    }

    let shorthands: HashSet<ShorthandKind> = parts
        .iter()
        .filter_map(|p| match p {
            ClassPart::Shorthand(k) => Some(*k),
            _ => None,
        })
        .collect();
    for range in &ranges {
        for shorthand in &shorthands {
            if shorthand_covers(*shorthand, *range) {
                return true;
            }
        }
    }

    false
}

/// Whether `\d`/`\w`/`\s` (or negations) already cover every codepoint in
/// `range` -- e.g. `[0-9\d]` or `[a-z\w]`.
fn shorthand_covers(shorthand: ShorthandKind, range: Interval) -> bool {
    let coverage: Vec<Interval> = match shorthand {
        ShorthandKind::Digit => vec![Interval::inclusive_range('0', '9')],
        ShorthandKind::Word => vec![
            Interval::inclusive_range('0', '9'),
            Interval::inclusive_range('A', 'Z'),
            Interval::inclusive_range('a', 'z'),
            Interval::single('_'),
        ],
        ShorthandKind::Whitespace => vec![
            Interval::single(' '),
            Interval::single('\t'),
            Interval::single('\n'),
            Interval::single('\r'),
        ],
        // Negated shorthands cover a disjoint, much larger set than any
        // plausible literal range; checking coverage for them isn't useful
        // here and risks false positives.
        ShorthandKind::NotDigit | ShorthandKind::NotWord | ShorthandKind::NotWhitespace => return false,
    };
    coverage.iter().any(|c| c.start <= range.start && range.end <= c.end)
}
