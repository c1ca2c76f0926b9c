//! A minimal `test`-only matcher (`spec.md` §4's "Matching" supplemental
//! detail): exists as test/verification plumbing for the NFA/DFA builders
//! and the solver's witness strings, mirroring the teacher's
//! `RegExp::test`/`RegExp::exec`, not as a product-facing execution engine
//! (`spec.md` §1's non-goals explicitly exclude that). Leftmost match with
//! capture groups (`RegExpMatch`) is out of scope here -- see `DESIGN.md`.

use crate::dfa::Dfa;
use crate::error::Result;
use crate::limits::Limits;
use crate::nfa;
use crate::parser;
use crate::pattern::Pattern;
use crate::subset_validator;

/// A compiled regular pattern, ready to answer whole-string `test` queries.
/// Built only for patterns inside the regular fragment; a pattern using
/// backreferences/lookaround/recursion fails at construction with
/// `RegexRayError::Unsupported`.
pub struct Regex {
    dfa: Dfa,
}

impl Regex {
    pub fn new(source: &str) -> Result<Self> {
        Self::with_limits(source, &Limits::default())
    }

    pub fn with_limits(source: &str, limits: &Limits) -> Result<Self> {
        let pattern = Pattern::parse(source)?;
        let parsed = parser::parse(&pattern.body)?;
        subset_validator::validate(&parsed.root).map_err(|e| crate::error::RegexRayError::unsupported(e.reason, e.span))?;
        let (fsm, alphabet) = nfa::build_nfa(&parsed.root, pattern.flags, limits)?;
        let dfa = Dfa::build(fsm, &alphabet, limits)?;
        Ok(Self { dfa })
    }

    /// Whole-string match, mirroring `RegExp::test` against an implicitly
    /// `^...$`-anchored subject (this crate has no partial/substring search
    /// surface -- the DFA back-end only answers whole-language questions).
    pub fn test(&self, text: &str) -> bool {
        self.dfa.accepts(text.chars())
    }
}
