//! Nested-quantifier rule (`spec.md` §4.4): flags a `QuantifierNode` that
//! dominates -- directly, or through a `SequenceNode`/non-atomic
//! `GroupNode`/`AlternationNode` -- another repeating construct capable of
//! catastrophic backtracking.
//!
//! **Resolved open question** (`spec.md` §9): the sampled slice doesn't fully
//! enumerate this rule's exact trigger condition, and the concrete scenarios
//! in `spec.md` §8 pull in opposite directions on "does the inner quantifier
//! need to be nullable" and "does a possessive inner always suppress". This
//! implementation's reading, which satisfies every `spec.md` §8 scenario:
//! the dominated construct is either (a) any non-possessive `QuantifierNode`
//! (nullability is not required -- `(a+)+` is flagged even though neither
//! `+` is nullable), or (b) a `RecursionNode`, which has no possessive form
//! and is just as capable of unbounded backtracking as an explicit
//! quantifier. An `Atomic` group is an opaque barrier: the search never
//! crosses into one.

use crate::ast::{GroupKind, Greediness, Node, NodeKind};

use super::{LintIssue, Severity};

pub const CODE: &str = "nested-quantifiers";

const MESSAGE: &str = "Nested quantifiers can cause catastrophic backtracking.";

pub fn check(root: &Node, issues: &mut Vec<LintIssue>) {
    walk(root, issues);
}

/// Pre-order: visit every node, and for each `QuantifierNode` search its
/// subtree for a dominated nested repetition before descending further.
fn walk(node: &Node, issues: &mut Vec<LintIssue>) {
    if let NodeKind::Quantifier { child, .. } = &node.kind {
        if contains_nested_repetition(child) {
            issues.push(LintIssue::new(Severity::Warning, CODE, MESSAGE, node.span));
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

/// Transparent search beneath a quantifier's child for a dominated
/// non-possessive quantifier or a recursion reference. Stops at atomic
/// groups (opaque) and does not cross into assertions/backrefs (the subset
/// validator rejects those downstream regardless).
fn contains_nested_repetition(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Quantifier { greediness, .. } if *greediness != Greediness::Possessive => true,
        NodeKind::Recursion(_) => true,
        NodeKind::Quantifier { child, .. } => contains_nested_repetition(child),
        NodeKind::Group { kind: GroupKind::Atomic, .. } => false,
        NodeKind::Group { child, .. } => contains_nested_repetition(child),
        NodeKind::Alternation { branches } => branches.iter().any(|b| contains_nested_repetition(b)),
        NodeKind::Sequence(children) => children.iter().any(|c| contains_nested_repetition(c)),
        NodeKind::Literal { .. }
        | NodeKind::CharClass { .. }
        | NodeKind::Anchor(_)
        | NodeKind::Backref(_)
        | NodeKind::Assertion { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn fires(body: &str) -> bool {
        let parsed = parser::parse(body).unwrap();
        let mut issues = Vec::new();
        check(&parsed.root, &mut issues);
        !issues.is_empty()
    }

    #[test]
    fn flags_classic_catastrophic_pattern() {
        assert!(fires("(a+)+"));
    }

    #[test]
    fn flags_nullable_inner_under_star() {
        assert!(fires("(a*)+"));
    }

    #[test]
    fn atomic_group_suppresses() {
        assert!(!fires("(?>a+)+"));
    }

    #[test]
    fn possessive_inner_suppresses() {
        assert!(!fires("(a++)+"));
    }

    #[test]
    fn single_quantifier_does_not_fire() {
        assert!(!fires("a+"));
    }

    #[test]
    fn recursion_under_star_fires() {
        assert!(fires("(?:a|(?R))*"));
    }
}
