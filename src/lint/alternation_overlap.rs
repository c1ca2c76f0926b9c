//! Alternation-overlap rule (`spec.md` §4.4): flags branches of an
//! `AlternationNode` whose FIRST-sets intersect, plus the more specific
//! "one literal branch is a prefix of another" diagnosis (`http`/`https`).

use crate::alphabet::Interval;
use crate::ast::{ClassPart, GroupKind, Node, NodeKind, NodePtr, ShorthandKind};

use super::{LintIssue, Severity};

pub const CODE: &str = "alternation-overlap";
pub const PREFIX_CODE: &str = "alternation-overlap-prefix";

const OVERLAP_MESSAGE: &str =
    "Alternation branches have overlapping character sets, which may cause unnecessary backtracking.";

pub fn check(root: &Node, issues: &mut Vec<LintIssue>) {
    walk(root, issues);
}

fn walk(node: &Node, issues: &mut Vec<LintIssue>) {
    if let NodeKind::Alternation { branches } = &node.kind {
        check_alternation(node, branches, issues);
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

fn check_alternation(alt_node: &Node, branches: &[NodePtr], issues: &mut Vec<LintIssue>) {
    let first_sets: Vec<Vec<Interval>> = branches.iter().map(|b| first_set(b).0).collect();
    let literals: Vec<Option<String>> = branches.iter().map(|b| literal_text(b)).collect();

    let mut any_overlap = false;
    for i in 0..branches.len() {
        for j in (i + 1)..branches.len() {
            if intervals_overlap(&first_sets[i], &first_sets[j]) {
                any_overlap = true;
            }
            if let (Some(a), Some(b)) = (&literals[i], &literals[j]) {
                if a != b && (a.starts_with(b.as_str()) || b.starts_with(a.as_str())) {
                    issues.push(LintIssue::new(
                        Severity::Warning,
                        PREFIX_CODE,
                        format!("Alternation branches \"{a}\" and \"{b}\" overlap."),
                        branches[i].span.join(branches[j].span),
                    ));
                }
            }
        }
    }

    if any_overlap {
        issues.push(LintIssue::new(Severity::Warning, CODE, OVERLAP_MESSAGE, alt_node.span));
    }
}

fn intervals_overlap(a: &[Interval], b: &[Interval]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.overlaps(y)))
}

/// Returns the set of codepoints `node` can begin matching with, plus
/// whether `node` itself can match the empty string (in which case a
/// following sibling in a `Sequence` also contributes to the FIRST-set).
/// Constructs whose first character isn't staticly knowable (backreferences,
/// recursion) contribute nothing rather than risk a false-positive overlap.
fn first_set(node: &Node) -> (Vec<Interval>, bool) {
    match &node.kind {
        NodeKind::Literal { value, .. } => (vec![Interval::single(*value)], false),
        NodeKind::CharClass { parts, negated } => {
            let mut raw = Vec::new();
            for part in parts {
                raw.extend(class_part_intervals(part));
            }
            let set = if *negated { crate::alphabet::invert_intervals(&raw) } else { raw };
            (set, false)
        }
        NodeKind::Anchor(_) | NodeKind::Assertion { .. } => (Vec::new(), true),
        NodeKind::Backref(_) | NodeKind::Recursion(_) => (Vec::new(), false),
        NodeKind::Group { child, .. } => first_set(child),
        NodeKind::Quantifier { child, min, .. } => {
            let (set, child_nullable) = first_set(child);
            (set, *min == 0 || child_nullable)
        }
        NodeKind::Alternation { branches } => {
            let mut set = Vec::new();
            let mut nullable = false;
            for b in branches {
                let (s, n) = first_set(b);
                set.extend(s);
                nullable |= n;
            }
            (set, nullable)
        }
        NodeKind::Sequence(children) => {
            let mut set = Vec::new();
            let mut nullable = true;
            for c in children {
                if !nullable {
                    break;
                }
                let (s, n) = first_set(c);
                set.extend(s);
                nullable = n;
            }
            (set, nullable)
        }
    }
}

fn class_part_intervals(part: &ClassPart) -> Vec<Interval> {
    match part {
        ClassPart::Literal(c) => vec![Interval::single(*c)],
        ClassPart::Range(lo, hi) => vec![Interval::inclusive_range(*lo, *hi)],
        ClassPart::Shorthand(kind) => shorthand_intervals(*kind),
        ClassPart::UnicodeProperty { .. } => crate::alphabet::invert_intervals(&[]),
        ClassPart::Any => crate::alphabet::invert_intervals(&[Interval::single('\n')]),
    }
}

fn shorthand_intervals(kind: ShorthandKind) -> Vec<Interval> {
    let positive = match kind {
        ShorthandKind::Digit | ShorthandKind::NotDigit => vec![Interval::inclusive_range('0', '9')],
        ShorthandKind::Word | ShorthandKind::NotWord => vec![
            Interval::inclusive_range('0', '9'),
            Interval::inclusive_range('A', 'Z'),
            Interval::inclusive_range('a', 'z'),
            Interval::single('_'),
        ],
        ShorthandKind::Whitespace | ShorthandKind::NotWhitespace => vec![
            Interval::single(' '),
            Interval::single('\t'),
            Interval::single('\n'),
            Interval::single('\r'),
        ],
    };
    if kind.is_negated() {
        crate::alphabet::invert_intervals(&positive)
    } else {
        positive
    }
}

/// Extracts `node`'s matched text if it's a plain concatenation of literal
/// characters (ignoring transparent non-capturing/capturing/named wrapper
/// groups), so the rule can compare literal alternatives for prefix
/// relationships. Anything else (classes, quantifiers, nested alternation)
/// returns `None`.
fn literal_text(node: &Node) -> Option<String> {
    match &node.kind {
        NodeKind::Literal { value, .. } => Some(value.to_string()),
        NodeKind::Sequence(children) => {
            let mut s = String::new();
            for c in children {
                s.push_str(&literal_text(c)?);
            }
            Some(s)
        }
        NodeKind::Group {
            child,
            kind: GroupKind::Capturing | GroupKind::NonCapturing | GroupKind::Named(_),
            ..
        } => literal_text(child),
        _ => None,
    }
}
