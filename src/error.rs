//! Error taxonomy surfaced at the crate boundary.
//!
//! Mirrors the four kinds from the design: malformed source (`Syntax`),
//! constructs outside the regular fragment (`Unsupported`), resource limits
//! exceeded during automaton construction or solving (`Complexity`), and
//! cache-backend failures (`Cache`, always recoverable).

use thiserror::Error;

use crate::span::Span;

pub type Result<T> = std::result::Result<T, RegexRayError>;

/// The specific defect recognized while lexing or parsing a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    MissingDelimiter,
    UnterminatedClass,
    UnterminatedGroup,
    BadEscape,
    InvalidQuantifier,
    BadRange,
    UnknownFlag,
}

impl std::fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingDelimiter => "missing delimiter",
            Self::UnterminatedClass => "unterminated character class",
            Self::UnterminatedGroup => "unterminated group",
            Self::BadEscape => "invalid escape sequence",
            Self::InvalidQuantifier => "quantifier has no preceding operand",
            Self::BadRange => "quantifier lower bound exceeds upper bound",
            Self::UnknownFlag => "unknown flag character",
        };
        f.write_str(s)
    }
}

/// Why a pattern or an operation over it exceeded a configured resource
/// ceiling. See [`crate::limits::Limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityErrorKind {
    TooManyDfaStates,
    TooManyAlphabetIntervals,
    PatternTooLong,
    NfaRecursionTooDeep,
    TooManyProductStates,
}

impl std::fmt::Display for ComplexityErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TooManyDfaStates => "too many DFA states",
            Self::TooManyAlphabetIntervals => "too many alphabet intervals",
            Self::PatternTooLong => "pattern exceeds the maximum length",
            Self::NfaRecursionTooDeep => "NFA construction recursed too deeply",
            Self::TooManyProductStates => "solver product automaton exceeded the state budget",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexRayError {
    #[error("{kind} at offset {offset}")]
    Syntax {
        kind: SyntaxErrorKind,
        offset: usize,
    },

    /// The pattern uses a construct outside the regular fragment (backrefs,
    /// lookaround, recursion) but a regular-language operation was requested.
    #[error("unsupported construct at {span:?}: {reason}")]
    Unsupported { reason: String, span: Span },

    #[error("{kind} (limit {limit})")]
    Complexity {
        kind: ComplexityErrorKind,
        limit: usize,
    },

    /// Cache-backend failure. Always logged and treated as a miss by callers;
    /// this variant exists so a cache implementation has something typed to
    /// return, not because the core ever lets it escape an analysis.
    #[error("cache backend error: {0}")]
    Cache(String),
}

impl RegexRayError {
    pub fn syntax(kind: SyntaxErrorKind, offset: usize) -> Self {
        Self::Syntax { kind, offset }
    }

    pub fn unsupported(reason: impl Into<String>, span: Span) -> Self {
        Self::Unsupported {
            reason: reason.into(),
            span,
        }
    }

    pub fn complexity(kind: ComplexityErrorKind, limit: usize) -> Self {
        Self::Complexity { kind, limit }
    }
}
