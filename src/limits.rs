//! Resource ceilings that bound worst-case work instead of relying on
//! cancellation or timeouts (there is no intrinsic timeout in this crate's
//! synchronous model; see `spec.md` §5).
//!
//! Shaped after `perl_regex::RegexValidator`'s named-field-with-defaults
//! limits (`max_nesting`, `max_unicode_properties`): small, explicit, checked
//! with an early return rather than a panic.

/// Hard ceilings enforced during NFA/DFA construction and solving. Exceeding
/// any of these fails fast with [`crate::error::RegexRayError::Complexity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length, in bytes, of a pattern's `source` (delimiters + body +
    /// flags combined).
    pub max_pattern_len: usize,

    /// Maximum number of states a constructed DFA may have, checked after
    /// every determinization step.
    pub max_dfa_states: usize,

    /// Maximum number of disjoint intervals the alphabet partition may have.
    pub max_alphabet_intervals: usize,

    /// Maximum recursion depth while lowering the AST to an NFA (bounds
    /// patterns with pathological nesting, e.g. `((((((...a...))))))`).
    pub max_nfa_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pattern_len: 32 * 1024,
            max_dfa_states: 10_000,
            max_alphabet_intervals: 4_096,
            max_nfa_depth: 256,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dfa_states(mut self, n: usize) -> Self {
        self.max_dfa_states = n;
        self
    }

    pub fn with_max_alphabet_intervals(mut self, n: usize) -> Self {
        self.max_alphabet_intervals = n;
        self
    }
}
