//! Confirms an AST lies in the regular fragment before it reaches the NFA
//! builder (`spec.md` §4.6): backreferences, recursion and lookaround
//! assertions are rejected, as is an unbounded quantifier nested inside a
//! lookbehind.
//!
//! The NFA builder (`nfa.rs`) already refuses these constructs defensively,
//! but the validator exists so a caller can get a precise `NotRegular`
//! diagnosis -- with the offending span -- without attempting a build.

use crate::ast::{Node, NodeKind};
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotRegular {
    pub reason: String,
    pub span: Span,
}

impl std::fmt::Display for NotRegular {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {:?}", self.reason, self.span)
    }
}

pub fn validate(root: &Node) -> Result<(), NotRegular> {
    walk(root)
}

/// `spec.md` §4.6 additionally calls out an unbounded quantifier nested
/// inside a lookbehind as its own rejection reason, but every `Assertion`
/// node -- lookbehind included -- is already rejected outright below before
/// its children are ever visited, so that nested case can never actually
/// arise: there is no lookbehind context left to nest under.
fn walk(node: &Node) -> Result<(), NotRegular> {
    match &node.kind {
        NodeKind::Backref(_) => Err(NotRegular {
            reason: "backreferences are not regular".to_owned(),
            span: node.span,
        }),
        NodeKind::Recursion(_) => Err(NotRegular {
            reason: "recursive patterns are not regular".to_owned(),
            span: node.span,
        }),
        NodeKind::Assertion { .. } => Err(NotRegular {
            reason: "lookaround assertions are not regular".to_owned(),
            span: node.span,
        }),
        NodeKind::Quantifier { child, .. } => walk(child),
        NodeKind::Group { child, .. } => walk(child),
        NodeKind::Alternation { branches } => {
            for b in branches {
                walk(b)?;
            }
            Ok(())
        }
        NodeKind::Sequence(children) => {
            for c in children {
                walk(c)?;
            }
            Ok(())
        }
        NodeKind::Literal { .. } | NodeKind::CharClass { .. } | NodeKind::Anchor(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn accepts_plain_regular_pattern() {
        let parsed = parser::parse("a(b|c)+d").unwrap();
        assert!(validate(&parsed.root).is_ok());
    }

    #[test]
    fn rejects_backreference() {
        let parsed = parser::parse(r"(a)\1").unwrap();
        assert!(validate(&parsed.root).is_err());
    }

    #[test]
    fn rejects_lookahead() {
        let parsed = parser::parse("a(?=b)").unwrap();
        assert!(validate(&parsed.root).is_err());
    }

    #[test]
    fn rejects_recursion() {
        let parsed = parser::parse("a(?R)").unwrap();
        assert!(validate(&parsed.root).is_err());
    }
}
