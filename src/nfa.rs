//! Thompson construction: lowers a regular (post subset-validator) AST into
//! an NFA over a decimated interval alphabet (`spec.md` §4.7).
//!
//! Grounded on the teacher's `regexp::node::to_automata_inner`, generalized
//! from the teacher's fixed byte alphabet to the interval-based alphabet
//! `spec.md` §9 calls for.

use crate::alphabet::{invert_intervals, Alphabet, Interval};
use crate::ast::{AnchorKind, ClassPart, Greediness, Node, NodeKind, ShorthandKind};
use crate::error::{ComplexityErrorKind, RegexRayError, Result};
use crate::fsm::FiniteStateMachine;
use crate::limits::Limits;
use crate::pattern::Flags;

pub type Fsm = FiniteStateMachine<Interval>;

struct BuildCtx<'a> {
    flags: Flags,
    alphabet: &'a Alphabet,
    limits: &'a Limits,
}

/// Builds the NFA for `node` plus the alphabet it was built over. Assumes
/// `node` has already passed [`crate::subset_validator`] -- encountering a
/// `Backref`/`Recursion`/`Assertion` here is a defensive `Unsupported` error,
/// not a first-class code path.
pub fn build_nfa(node: &Node, flags: Flags, limits: &Limits) -> Result<(Fsm, Alphabet)> {
    let mut alphabet = Alphabet::new();
    let mut anchors_present = false;
    collect_alphabet(node, flags, &mut alphabet, &mut anchors_present);
    if anchors_present {
        alphabet.insert(Interval::start_of_string());
        alphabet.insert(Interval::end_of_string());
    }

    if alphabet.len() > limits.max_alphabet_intervals {
        return Err(RegexRayError::complexity(
            ComplexityErrorKind::TooManyAlphabetIntervals,
            limits.max_alphabet_intervals,
        ));
    }

    let ctx = BuildCtx {
        flags,
        alphabet: &alphabet,
        limits,
    };
    let fsm = build(node, &ctx, 0)?;
    Ok((fsm, alphabet))
}

fn collect_alphabet(node: &Node, flags: Flags, alphabet: &mut Alphabet, anchors_present: &mut bool) {
    match &node.kind {
        NodeKind::Literal { value, .. } => alphabet.insert_many(&literal_intervals(*value, flags)),
        NodeKind::CharClass { parts, .. } => {
            for part in parts {
                alphabet.insert_many(&class_part_intervals(part, flags));
            }
        }
        NodeKind::Anchor(_) => *anchors_present = true,
        NodeKind::Group { child, .. }
        | NodeKind::Assertion { child, .. }
        | NodeKind::Quantifier { child, .. } => collect_alphabet(child, flags, alphabet, anchors_present),
        NodeKind::Alternation { branches } => {
            for b in branches {
                collect_alphabet(b, flags, alphabet, anchors_present);
            }
        }
        NodeKind::Sequence(children) => {
            for c in children {
                collect_alphabet(c, flags, alphabet, anchors_present);
            }
        }
        NodeKind::Backref(_) | NodeKind::Recursion(_) => {}
    }
}

fn build(node: &Node, ctx: &BuildCtx, depth: usize) -> Result<Fsm> {
    if depth > ctx.limits.max_nfa_depth {
        return Err(RegexRayError::complexity(
            ComplexityErrorKind::NfaRecursionTooDeep,
            ctx.limits.max_nfa_depth,
        ));
    }

    match &node.kind {
        NodeKind::Literal { value, .. } => atom_from_intervals(literal_intervals(*value, ctx.flags), ctx),
        NodeKind::CharClass { parts, negated } => {
            let mut raw = Vec::new();
            for part in parts {
                raw.extend(class_part_intervals(part, ctx.flags));
            }
            let final_intervals = if *negated { invert_intervals(&raw) } else { raw };
            atom_from_intervals(final_intervals, ctx)
        }
        NodeKind::Anchor(kind) => Ok(anchor_fsm(*kind, ctx)),
        NodeKind::Group { child, .. } => build(child, ctx, depth + 1),
        NodeKind::Assertion { .. } => Err(RegexRayError::unsupported(
            "lookaround assertions do not reach the automaton",
            node.span,
        )),
        NodeKind::Backref(_) => Err(RegexRayError::unsupported("backreferences are not regular", node.span)),
        NodeKind::Recursion(_) => Err(RegexRayError::unsupported("recursive patterns are not regular", node.span)),
        NodeKind::Quantifier { child, min, max, greediness: _ } => {
            let base = build(child, ctx, depth + 1)?;
            Ok(build_quantifier(base, *min, *max))
        }
        NodeKind::Alternation { branches } => {
            let mut iter = branches.iter();
            let mut acc = build(iter.next().expect("alternation has >= 2 branches"), ctx, depth + 1)?;
            for b in iter {
                acc.join(build(b, ctx, depth + 1)?);
            }
            Ok(acc)
        }
        NodeKind::Sequence(children) => {
            let mut acc = Fsm::zero();
            for c in children {
                acc.then(build(c, ctx, depth + 1)?);
            }
            Ok(acc)
        }
    }
}

fn atom_from_intervals(raw: Vec<Interval>, ctx: &BuildCtx) -> Result<Fsm> {
    let mut fsm = Fsm::new();
    let s = fsm.add_state();
    let e = fsm.add_state();
    fsm.mark_start(s);
    fsm.mark_accept(e);
    for sym in ctx.alphabet.decimate(&raw) {
        fsm.add_transition(s, sym, e);
    }
    Ok(fsm)
}

/// `^`/`\A`/`\G` require the `⟨start⟩` sentinel; `$`/`\z`/`\Z` require
/// `⟨end⟩`. `\b` is approximated as "at either string boundary" and `\B` as
/// an unconditional epsilon -- true mid-string word-boundary semantics would
/// need a richer alphabet than codepoint intervals (documented in
/// `DESIGN.md`).
fn anchor_fsm(kind: AnchorKind, ctx: &BuildCtx) -> Fsm {
    match kind {
        AnchorKind::StartOfLineOrString | AnchorKind::StartOfString | AnchorKind::EndOfPreviousMatch => {
            sentinel_fsm(Interval::start_of_string(), ctx)
        }
        AnchorKind::EndOfLineOrString | AnchorKind::EndOfStringNoNewline | AnchorKind::EndOfStringOrNewline => {
            sentinel_fsm(Interval::end_of_string(), ctx)
        }
        AnchorKind::WordBoundary => {
            let mut fsm = sentinel_fsm(Interval::start_of_string(), ctx);
            fsm.join(sentinel_fsm(Interval::end_of_string(), ctx));
            fsm
        }
        AnchorKind::NotWordBoundary => Fsm::zero(),
    }
}

fn sentinel_fsm(sentinel: Interval, ctx: &BuildCtx) -> Fsm {
    let mut fsm = Fsm::new();
    let s = fsm.add_state();
    let e = fsm.add_state();
    fsm.mark_start(s);
    fsm.mark_accept(e);
    for sym in ctx.alphabet.decimate(&[sentinel]) {
        fsm.add_transition(s, sym, e);
    }
    fsm
}

/// Unrolls `child{min,max}` per `spec.md` §4.7: `min` mandatory copies, then
/// either `max - min` optional copies or (if `max` is unbounded) a
/// loop-with-epsilon-bypass appended after the mandatory copies.
fn build_quantifier(base: Fsm, min: usize, max: Option<usize>) -> Fsm {
    let mut result = Fsm::zero();
    for _ in 0..min {
        result.then(base.clone());
    }

    match max {
        None => {
            let mut star = base.clone();
            star.then_loop();
            star.join(Fsm::zero());
            result.then(star);
        }
        Some(max) => {
            for _ in 0..max.saturating_sub(min) {
                let mut optional = base.clone();
                optional.join(Fsm::zero());
                result.then(optional);
            }
        }
    }

    result
}

/// Literal `'a'` under the case-insensitive flag also admits its opposite
/// case (ASCII only -- full Unicode case folding is out of scope).
fn literal_intervals(c: char, flags: Flags) -> Vec<Interval> {
    if flags.contains(Flags::CASE_INSENSITIVE) && c.is_ascii_alphabetic() {
        vec![Interval::single(ascii_swap_case(c)), Interval::single(c)]
    } else {
        vec![Interval::single(c)]
    }
}

fn ascii_swap_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}

/// Same ASCII-only case-insensitive mirroring, applied to an inclusive range
/// whose endpoints are both ASCII letters of the same case.
fn maybe_case_fold_range(lo: char, hi: char, flags: Flags) -> Vec<Interval> {
    let mut out = vec![Interval::inclusive_range(lo, hi)];
    if flags.contains(Flags::CASE_INSENSITIVE)
        && lo.is_ascii_alphabetic()
        && hi.is_ascii_alphabetic()
        && lo.is_ascii_lowercase() == hi.is_ascii_lowercase()
    {
        out.push(Interval::inclusive_range(ascii_swap_case(lo), ascii_swap_case(hi)));
    }
    out
}

fn class_part_intervals(part: &ClassPart, flags: Flags) -> Vec<Interval> {
    match part {
        ClassPart::Literal(c) => literal_intervals(*c, flags),
        ClassPart::Range(lo, hi) => maybe_case_fold_range(*lo, *hi, flags),
        ClassPart::Shorthand(kind) => shorthand_intervals(*kind),
        ClassPart::UnicodeProperty { .. } => {
            // Unrecognized/unmodeled Unicode categories fall back to the
            // full codepoint domain rather than silently under-matching.
            invert_intervals(&[])
        }
        ClassPart::Any => {
            let newline = Interval::single('\n');
            if flags.contains(Flags::DOT_ALL) {
                invert_intervals(&[])
            } else {
                invert_intervals(&[newline])
            }
        }
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
            Interval::single('\u{b}'),
            Interval::single('\u{c}'),
        ],
    };
    if kind.is_negated() {
        invert_intervals(&positive)
    } else {
        positive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn nfa_for(body: &str, flags: Flags) -> Fsm {
        let parsed = parser::parse(body).unwrap();
        let (fsm, _alphabet) = build_nfa(&parsed.root, flags, &Limits::default()).unwrap();
        fsm
    }

    #[test]
    fn literal_concatenation_matches_exact_string() {
        let dfa = nfa_for("abc", Flags::empty()).compute_dfa();
        assert!(dfa.accepts("abc".chars()));
        assert!(!dfa.accepts("ab".chars()));
    }

    #[test]
    fn star_quantifier_allows_zero_or_more() {
        let dfa = nfa_for("ab*", Flags::empty()).compute_dfa();
        assert!(dfa.accepts("a".chars()));
        assert!(dfa.accepts("abbbb".chars()));
        assert!(!dfa.accepts("b".chars()));
    }

    #[test]
    fn bounded_quantifier_respects_range() {
        let dfa = nfa_for("a{2,3}", Flags::empty()).compute_dfa();
        assert!(!dfa.accepts("a".chars()));
        assert!(dfa.accepts("aa".chars()));
        assert!(dfa.accepts("aaa".chars()));
        assert!(!dfa.accepts("aaaa".chars()));
    }

    #[test]
    fn char_class_negation() {
        let dfa = nfa_for("[^a-c]", Flags::empty()).compute_dfa();
        assert!(dfa.accepts("d".chars()));
        assert!(!dfa.accepts("b".chars()));
    }

    #[test]
    fn case_insensitive_literal() {
        let dfa = nfa_for("a", Flags::CASE_INSENSITIVE).compute_dfa();
        assert!(dfa.accepts("a".chars()));
        assert!(dfa.accepts("A".chars()));
    }

    #[test]
    fn rejects_backreference() {
        let parsed = parser::parse(r"(a)\1").unwrap();
        assert!(build_nfa(&parsed.root, Flags::empty(), &Limits::default()).is_err());
    }
}
