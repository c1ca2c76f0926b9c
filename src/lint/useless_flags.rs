//! Useless-flag rule (`spec.md` §4.4): a flag that can't possibly change
//! matching behavior for this particular pattern's body.

use crate::ast::{AnchorKind, ClassPart, Node, NodeKind};
use crate::pattern::Pattern;
use crate::span::Span;

use super::{LintIssue, Severity};

pub const CODE: &str = "useless-flag";

pub fn check(pattern: &Pattern, root: &Node, issues: &mut Vec<LintIssue>) {
    for &(flag, offset) in &pattern.flag_origins {
        let span = Span::new(offset, offset + 1);
        match flag {
            'i' if !has_cased_codepoint(root) => issues.push(LintIssue::new(
                Severity::Optimization,
                CODE,
                "Flag 'i' is useless: the pattern contains no case-sensitive characters.",
                span,
            )),
            's' if !contains_dot(root) => issues.push(LintIssue::new(
                Severity::Optimization,
                CODE,
                "Flag 's' is useless: the pattern contains no '.' wildcard.",
                span,
            )),
            'm' if !contains_line_anchor(root) => issues.push(LintIssue::new(
                Severity::Optimization,
                CODE,
                "Flag 'm' is useless: the pattern contains no '^' or '$' anchor.",
                span,
            )),
            'x' if !pattern.body.chars().any(|c| c.is_whitespace() || c == '#') => issues.push(LintIssue::new(
                Severity::Optimization,
                CODE,
                "Flag 'x' is useless: the pattern body contains no whitespace or '#' comments.",
                span,
            )),
            _ => {}
        }
    }
}

fn has_cased_codepoint(node: &Node) -> bool {
    any_node(node, &|n| match &n.kind {
        NodeKind::Literal { value, .. } => value.is_alphabetic() && value.to_lowercase().ne(value.to_uppercase()),
        NodeKind::CharClass { parts, .. } => parts.iter().any(class_part_is_cased),
        _ => false,
    })
}

fn class_part_is_cased(part: &ClassPart) -> bool {
    match part {
        ClassPart::Literal(c) => c.is_alphabetic() && c.to_lowercase().ne(c.to_uppercase()),
        ClassPart::Range(lo, hi) => lo.is_alphabetic() || hi.is_alphabetic(),
        ClassPart::Shorthand(k) => matches!(
            k,
            crate::ast::ShorthandKind::Word | crate::ast::ShorthandKind::NotWord
        ),
        ClassPart::UnicodeProperty { .. } => true,
        ClassPart::Any => false,
    }
}

fn contains_dot(node: &Node) -> bool {
    any_node(node, &|n| match &n.kind {
        NodeKind::CharClass { parts, negated: false } => parts.len() == 1 && parts[0] == ClassPart::Any,
        _ => false,
    })
}

fn contains_line_anchor(node: &Node) -> bool {
    any_node(node, &|n| {
        matches!(
            &n.kind,
            NodeKind::Anchor(AnchorKind::StartOfLineOrString) | NodeKind::Anchor(AnchorKind::EndOfLineOrString)
        )
    })
}

fn any_node(node: &Node, pred: &dyn Fn(&Node) -> bool) -> bool {
    if pred(node) {
        return true;
    }
    match &node.kind {
        NodeKind::Group { child, .. } | NodeKind::Assertion { child, .. } | NodeKind::Quantifier { child, .. } => {
            any_node(child, pred)
        }
        NodeKind::Alternation { branches } => branches.iter().any(|b| any_node(b, pred)),
        NodeKind::Sequence(children) => children.iter().any(|c| any_node(c, pred)),
        NodeKind::Literal { .. }
        | NodeKind::CharClass { .. }
        | NodeKind::Anchor(_)
        | NodeKind::Backref(_)
        | NodeKind::Recursion(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn messages(source: &str) -> Vec<String> {
        let pattern = Pattern::parse(source).unwrap();
        let parsed = parser::parse(&pattern.body).unwrap();
        let mut issues = Vec::new();
        check(&pattern, &parsed.root, &mut issues);
        issues.into_iter().map(|i| i.message).collect()
    }

    #[test]
    fn flags_useless_case_insensitive_on_digits() {
        let msgs = messages("/[0-9]+/i");
        assert!(msgs
            .iter()
            .any(|m| m == "Flag 'i' is useless: the pattern contains no case-sensitive characters."));
    }

    #[test]
    fn case_insensitive_is_not_useless_with_letters() {
        let msgs = messages("/[a-z]+/i");
        assert!(msgs.is_empty());
    }

    #[test]
    fn flags_useless_dotall_without_wildcard() {
        let msgs = messages("/abc/s");
        assert!(msgs.iter().any(|m| m.contains("Flag 's'")));
    }

    #[test]
    fn flags_useless_multiline_without_anchors() {
        let msgs = messages("/abc/m");
        assert!(msgs.iter().any(|m| m.contains("Flag 'm'")));
    }

    #[test]
    fn flags_useless_extended_without_whitespace() {
        let msgs = messages("/abc/x");
        assert!(msgs.iter().any(|m| m.contains("Flag 'x'")));
    }
}
