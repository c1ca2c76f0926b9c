//! Recursive-descent parser: tokens from [`crate::lexer`] become an
//! [`ast::Node`] tree, by precedence `alternation → concatenation →
//! quantified → atom` (`spec.md` §4.2).
//!
//! Written fresh alongside `lexer.rs` rather than adapted from the teacher's
//! `regexp::syntax` combinators, since the teacher parses directly from text
//! via its own internal `parsing` crate -- noted in `DESIGN.md`.

use crate::ast::{
    AssertionKind, ClassPart, GroupKind, GroupRef, Node, NodeKind, NodePtr, NamedGroups,
    RecursionTarget,
};
use crate::error::{RegexRayError, Result, SyntaxErrorKind};
use crate::lexer::{self, EscapeKind, GroupOpen, Token, TokenKind};
use crate::span::Span;

pub struct ParseResult {
    pub root: NodePtr,
    pub named_groups: NamedGroups,
    pub group_count: usize,
}

pub fn parse(body: &str) -> Result<ParseResult> {
    let tokens = lexer::tokenize(body)?;
    let mut parser = Parser {
        body,
        tokens,
        pos: 0,
        next_group_index: 1,
        named_groups: NamedGroups::default(),
    };
    let root = parser.parse_alternation()?;
    if parser.pos != parser.tokens.len() {
        let span = parser.tokens[parser.pos].span;
        return Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedGroup, span.start));
    }
    Ok(ParseResult {
        root,
        named_groups: parser.named_groups,
        group_count: parser.next_group_index - 1,
    })
}

struct Parser<'a> {
    body: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    next_group_index: usize,
    named_groups: NamedGroups,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.body.len(), self.body.len()))
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn at_stop_token(&self) -> bool {
        matches!(self.peek(), None | Some(TokenKind::Alternation) | Some(TokenKind::CloseGroup))
    }

    fn raw(&self, span: Span) -> String {
        self.body[span.start..span.end].to_owned()
    }

    /// `alternation → concatenation (| concatenation)*`
    fn parse_alternation(&mut self) -> Result<NodePtr> {
        let start_span = self.peek_span();
        let mut branches = vec![self.parse_concatenation()?];
        while matches!(self.peek(), Some(TokenKind::Alternation)) {
            self.advance();
            branches.push(self.parse_concatenation()?);
        }
        if branches.len() == 1 {
            return Ok(branches.pop().unwrap());
        }
        let span = branches.iter().fold(start_span, |acc, b| acc.join(b.span));
        Ok(Node::new(NodeKind::Alternation { branches }, span))
    }

    /// `concatenation → quantified*`
    fn parse_concatenation(&mut self) -> Result<NodePtr> {
        let start_span = self.peek_span();
        let mut children = Vec::new();
        while !self.at_stop_token() {
            children.push(self.parse_quantified()?);
        }
        if children.is_empty() {
            return Ok(Node::synthetic(NodeKind::Sequence(Vec::new())));
        }
        if children.len() == 1 {
            return Ok(children.pop().unwrap());
        }
        let span = children.iter().fold(start_span, |acc, c| acc.join(c.span));
        Ok(Node::new(NodeKind::Sequence(children), span))
    }

    /// `quantified → atom quantifier?`
    fn parse_quantified(&mut self) -> Result<NodePtr> {
        let atom = self.parse_atom()?;
        if let Some(TokenKind::Quantifier { min, max, greediness }) = self.peek().cloned() {
            let qtok = self.advance().unwrap();
            let span = atom.span.join(qtok.span);
            return Ok(Node::new(
                NodeKind::Quantifier {
                    child: atom,
                    min,
                    max,
                    greediness,
                },
                span,
            ));
        }
        Ok(atom)
    }

    fn parse_atom(&mut self) -> Result<NodePtr> {
        let span = self.peek_span();
        let kind = match self.peek() {
            None => return Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedGroup, span.start)),
            Some(TokenKind::Quantifier { .. }) => {
                return Err(RegexRayError::syntax(SyntaxErrorKind::InvalidQuantifier, span.start))
            }
            Some(TokenKind::Literal(c)) => {
                let c = *c;
                self.advance();
                NodeKind::Literal { value: c, raw: c.to_string() }
            }
            Some(TokenKind::Dot) => {
                self.advance();
                NodeKind::CharClass { parts: vec![ClassPart::Any], negated: false }
            }
            Some(TokenKind::Anchor(kind)) => {
                let kind = *kind;
                self.advance();
                NodeKind::Anchor(kind)
            }
            Some(TokenKind::Escape(_)) => return self.parse_escape_atom(),
            Some(TokenKind::OpenClass { .. }) => return self.parse_class(),
            Some(TokenKind::OpenGroup(_)) => return self.parse_group(),
            Some(TokenKind::CloseGroup) => {
                return Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedGroup, span.start))
            }
            Some(TokenKind::Alternation) => {
                return Err(RegexRayError::syntax(SyntaxErrorKind::InvalidQuantifier, span.start))
            }
            Some(TokenKind::Range) | Some(TokenKind::CloseClass) => {
                return Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedGroup, span.start))
            }
        };
        Ok(Node::new(kind, span))
    }

    fn parse_escape_atom(&mut self) -> Result<NodePtr> {
        let tok = self.advance().unwrap();
        let span = tok.span;
        let kind = match tok.kind {
            TokenKind::Escape(EscapeKind::Shorthand(k)) => {
                NodeKind::CharClass { parts: vec![ClassPart::Shorthand(k)], negated: false }
            }
            TokenKind::Escape(EscapeKind::UnicodeProperty { name, negated }) => NodeKind::CharClass {
                parts: vec![ClassPart::UnicodeProperty { name, negated: false }],
                negated,
            },
            TokenKind::Escape(EscapeKind::Literal(c)) => {
                NodeKind::Literal { value: c, raw: self.raw(span) }
            }
            TokenKind::Escape(EscapeKind::Backref(r)) => NodeKind::Backref(r),
            _ => unreachable!("parse_escape_atom called on non-escape token"),
        };
        Ok(Node::new(kind, span))
    }

    fn expect_close_group(&mut self, open_span: Span) -> Result<Span> {
        match self.peek() {
            Some(TokenKind::CloseGroup) => Ok(self.advance().unwrap().span),
            _ => Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedGroup, open_span.start)),
        }
    }

    fn parse_group(&mut self) -> Result<NodePtr> {
        let open_tok = self.advance().unwrap();
        let open_span = open_tok.span;
        let open = match open_tok.kind {
            TokenKind::OpenGroup(g) => g,
            _ => unreachable!(),
        };

        let (kind, index) = match open {
            GroupOpen::Recursion(target) => {
                let close_span = self.expect_close_group(open_span)?;
                return Ok(Node::new(NodeKind::Recursion(target), open_span.join(close_span)));
            }
            GroupOpen::Lookahead => return self.parse_assertion_body(AssertionKind::Lookahead, open_span),
            GroupOpen::NegativeLookahead => {
                return self.parse_assertion_body(AssertionKind::NegativeLookahead, open_span)
            }
            GroupOpen::Lookbehind => return self.parse_assertion_body(AssertionKind::Lookbehind, open_span),
            GroupOpen::NegativeLookbehind => {
                return self.parse_assertion_body(AssertionKind::NegativeLookbehind, open_span)
            }
            GroupOpen::BranchReset => return self.parse_branch_reset_body(open_span),
            GroupOpen::Capturing => {
                let idx = self.next_group_index;
                self.next_group_index += 1;
                (GroupKind::Capturing, Some(idx))
            }
            GroupOpen::NonCapturing => (GroupKind::NonCapturing, None),
            GroupOpen::Atomic => (GroupKind::Atomic, None),
            GroupOpen::Named(name) => {
                let idx = self.next_group_index;
                self.next_group_index += 1;
                self.named_groups.0.insert(name.clone(), idx);
                (GroupKind::Named(name), Some(idx))
            }
        };

        let child = self.parse_alternation()?;
        let close_span = self.expect_close_group(open_span)?;
        Ok(Node::new(
            NodeKind::Group { child, kind, index },
            open_span.join(close_span),
        ))
    }

    fn parse_assertion_body(&mut self, kind: AssertionKind, open_span: Span) -> Result<NodePtr> {
        let child = self.parse_alternation()?;
        let close_span = self.expect_close_group(open_span)?;
        Ok(Node::new(
            NodeKind::Assertion { kind, child },
            open_span.join(close_span),
        ))
    }

    /// `(|a|b|c)`: every branch shares the same starting group-index
    /// allocation; numbering resumes after the highest index used by any
    /// branch.
    fn parse_branch_reset_body(&mut self, open_span: Span) -> Result<NodePtr> {
        let reset_to = self.next_group_index;
        let mut max_index = reset_to;
        let mut branches = Vec::new();

        loop {
            self.next_group_index = reset_to;
            branches.push(self.parse_concatenation()?);
            max_index = max_index.max(self.next_group_index);
            if matches!(self.peek(), Some(TokenKind::Alternation)) {
                self.advance();
                continue;
            }
            break;
        }
        self.next_group_index = max_index;

        let close_span = self.expect_close_group(open_span)?;
        let span = open_span.join(close_span);
        let child = if branches.len() == 1 {
            branches.pop().unwrap()
        } else {
            let inner_span = branches.iter().fold(open_span, |acc, b| acc.join(b.span));
            Node::new(NodeKind::Alternation { branches }, inner_span)
        };
        Ok(Node::new(
            NodeKind::Group { child, kind: GroupKind::BranchReset, index: None },
            span,
        ))
    }

    fn parse_class(&mut self) -> Result<NodePtr> {
        let open_tok = self.advance().unwrap();
        let open_span = open_tok.span;
        let negated = match open_tok.kind {
            TokenKind::OpenClass { negated } => negated,
            _ => unreachable!(),
        };

        let mut parts: Vec<ClassPart> = Vec::new();
        loop {
            match self.peek() {
                Some(TokenKind::CloseClass) => {
                    let close_tok = self.advance().unwrap();
                    let span = open_span.join(close_tok.span);
                    return Ok(Node::new(NodeKind::CharClass { parts, negated }, span));
                }
                None => {
                    return Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedClass, open_span.start))
                }
                Some(TokenKind::Escape(EscapeKind::Shorthand(k))) => {
                    let k = *k;
                    self.advance();
                    parts.push(ClassPart::Shorthand(k));
                }
                Some(TokenKind::Escape(EscapeKind::UnicodeProperty { .. })) => {
                    let tok = self.advance().unwrap();
                    if let TokenKind::Escape(EscapeKind::UnicodeProperty { name, negated }) = tok.kind {
                        parts.push(ClassPart::UnicodeProperty { name, negated });
                    }
                }
                Some(TokenKind::Literal(_)) | Some(TokenKind::Escape(EscapeKind::Literal(_))) => {
                    let lo = self.consume_class_char()?;
                    if matches!(self.peek(), Some(TokenKind::Range)) {
                        self.advance();
                        let hi_span = self.peek_span();
                        let hi = self.consume_class_char().map_err(|_| {
                            RegexRayError::syntax(SyntaxErrorKind::BadRange, hi_span.start)
                        })?;
                        if hi < lo {
                            return Err(RegexRayError::syntax(SyntaxErrorKind::BadRange, hi_span.start));
                        }
                        parts.push(ClassPart::Range(lo, hi));
                    } else {
                        parts.push(ClassPart::Literal(lo));
                    }
                }
                Some(TokenKind::Range) => {
                    // A dash the lexer couldn't attach to a preceding literal
                    // (e.g. right after `[`) is just a literal dash.
                    self.advance();
                    parts.push(ClassPart::Literal('-'));
                }
                Some(_) => {
                    return Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedClass, open_span.start))
                }
            }
        }
    }

    fn consume_class_char(&mut self) -> Result<char> {
        match self.advance().map(|t| t.kind) {
            Some(TokenKind::Literal(c)) => Ok(c),
            Some(TokenKind::Escape(EscapeKind::Literal(c))) => Ok(c),
            _ => Err(RegexRayError::syntax(SyntaxErrorKind::UnterminatedClass, self.peek_span().start)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AnchorKind, Greediness, NodeKind as NK};

    #[test]
    fn parses_literal_sequence() {
        let r = parse("ab").unwrap();
        match &r.root.kind {
            NK::Sequence(children) => assert_eq!(children.len(), 2),
            other => panic!("expected Sequence, got {:?}", other),
        }
    }

    #[test]
    fn parses_alternation() {
        let r = parse("a|b|c").unwrap();
        match &r.root.kind {
            NK::Alternation { branches } => assert_eq!(branches.len(), 3),
            other => panic!("expected Alternation, got {:?}", other),
        }
    }

    #[test]
    fn assigns_group_indices_left_to_right() {
        let r = parse("(a)(b(c))").unwrap();
        assert_eq!(r.group_count, 3);
    }

    #[test]
    fn named_group_shares_index_space() {
        let r = parse("(a)(?<x>b)").unwrap();
        assert_eq!(r.group_count, 2);
        assert_eq!(r.named_groups.0.get("x"), Some(&2));
    }

    #[test]
    fn quantifier_without_operand_fails() {
        assert!(parse("*a").is_err());
    }

    #[test]
    fn inverted_quantifier_range_fails() {
        assert!(parse("a{3,1}").is_err());
    }

    #[test]
    fn parses_nested_quantified_group() {
        let r = parse("(a+)+").unwrap();
        match &r.root.kind {
            NK::Quantifier { child, min: 1, max: None, greediness: Greediness::Greedy } => {
                match &child.kind {
                    NK::Group { child: inner, .. } => match &inner.kind {
                        NK::Quantifier { min: 1, max: None, .. } => {}
                        other => panic!("expected inner quantifier, got {:?}", other),
                    },
                    other => panic!("expected Group, got {:?}", other),
                }
            }
            other => panic!("expected outer quantifier, got {:?}", other),
        }
    }

    #[test]
    fn parses_lookahead_assertion() {
        let r = parse("a(?=b)").unwrap();
        match &r.root.kind {
            NK::Sequence(children) => {
                assert!(matches!(children[1].kind, NK::Assertion { kind: AssertionKind::Lookahead, .. }));
            }
            other => panic!("expected Sequence, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_group_fails() {
        assert!(parse("(a").is_err());
    }

    #[test]
    fn parses_recursion() {
        let r = parse("a(?R)").unwrap();
        match &r.root.kind {
            NK::Sequence(children) => {
                assert!(matches!(children[1].kind, NK::Recursion(RecursionTarget::Root)));
            }
            other => panic!("expected Sequence, got {:?}", other),
        }
    }

    #[test]
    fn parses_backref() {
        let r = parse(r"(a)\1").unwrap();
        match &r.root.kind {
            NK::Sequence(children) => {
                assert!(matches!(&children[1].kind, NK::Backref(GroupRef::Index(1))));
            }
            other => panic!("expected Sequence, got {:?}", other),
        }
    }
}
