//! `Pattern`: the `(source, body, flags)` triple described in `spec.md` §3,
//! plus delimiter stripping and flag parsing (`spec.md` §6).

use bitflags::bitflags;

use crate::error::{RegexRayError, Result, SyntaxErrorKind};

bitflags! {
    /// PCRE-style modifier flags. Substitutes the teacher's
    /// `define_bit_flags!`-generated `vm::flags::Flags` with the published
    /// `bitflags` crate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u16 {
        /// Case-insensitive matching.
        const CASE_INSENSITIVE = 1 << 0;
        /// `^`/`$` match at embedded newlines, not just string boundaries.
        const MULTILINE        = 1 << 1;
        /// `.` also matches newline.
        const DOT_ALL          = 1 << 2;
        /// Extended: whitespace and `#...` comments in the body are insignificant.
        const EXTENDED         = 1 << 3;
        /// Unicode mode: character classes/properties operate over code points.
        const UNICODE          = 1 << 4;
        /// Ungreedy: swap the default greediness of quantifiers.
        const UNGREEDY         = 1 << 5;
        /// Disable the `(?<name>...)` requirement that duplicate names be
        /// distinguished -- allows duplicate named groups.
        const DUPE_NAMES       = 1 << 6;
        /// Enables the PCRE_INFO_JCHANGED 'J' option (duplicate subpattern
        /// names resolved locally to the branch they occur in).
        const JCHANGED         = 1 << 7;
        /// Anchored: the pattern is implicitly anchored to the start of the
        /// subject (or of each search position), as if prefixed with `\A`.
        const ANCHORED         = 1 << 8;
    }
}

impl Flags {
    /// Parses the trailing flag letters of a pattern (`i m s x u U D A J`).
    /// Fails with `UnknownFlag` at the offset of the first unrecognized
    /// character.
    pub fn parse_from(s: &str, body_len: usize) -> Result<(Self, Vec<(char, usize)>)> {
        let mut flags = Self::empty();
        let mut origins = Vec::with_capacity(s.len());

        for (i, c) in s.char_indices() {
            let bit = match c {
                'i' => Self::CASE_INSENSITIVE,
                'm' => Self::MULTILINE,
                's' => Self::DOT_ALL,
                'x' => Self::EXTENDED,
                'u' => Self::UNICODE,
                'U' => Self::UNGREEDY,
                'D' => Self::DUPE_NAMES,
                'A' => Self::ANCHORED,
                'J' => Self::JCHANGED,
                _ => {
                    return Err(RegexRayError::syntax(
                        SyntaxErrorKind::UnknownFlag,
                        body_len + i,
                    ))
                }
            };
            flags |= bit;
            origins.push((c, body_len + i));
        }

        Ok((flags, origins))
    }
}

/// The bracket-style delimiter pairs recognized in addition to "delimiter
/// repeated on both ends" (`/.../ `, `#...#`, ...).
const BRACKET_PAIRS: &[(char, char)] = &[('(', ')'), ('{', '}'), ('[', ']'), ('<', '>')];

fn closing_delimiter(open: char) -> char {
    for (a, b) in BRACKET_PAIRS {
        if *a == open {
            return *b;
        }
    }
    open
}

/// A parsed pattern: `source = openDelim + body + closeDelim + flags`.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub body: String,
    pub flags: Flags,
    pub flag_origins: Vec<(char, usize)>,
}

impl Pattern {
    /// Splits a raw delimited pattern string (e.g. `"/foo/i"`,
    /// `"~args.*~"`, `"#a#x"`) into its body and flags.
    pub fn parse(source: &str) -> Result<Self> {
        let mut chars = source.char_indices();
        let (_, open) = chars
            .next()
            .ok_or_else(|| RegexRayError::syntax(SyntaxErrorKind::MissingDelimiter, 0))?;

        if open.is_alphanumeric() || open == '\\' || open.is_whitespace() {
            return Err(RegexRayError::syntax(SyntaxErrorKind::MissingDelimiter, 0));
        }

        let close = closing_delimiter(open);
        let open_len = open.len_utf8();

        let rest = &source[open_len..];
        let close_idx = find_matching_close(rest, open, close)
            .ok_or_else(|| RegexRayError::syntax(SyntaxErrorKind::MissingDelimiter, source.len()))?;

        let body = &rest[..close_idx];
        let after_close = &rest[close_idx + close.len_utf8()..];

        let (flags, flag_origins) = Flags::parse_from(after_close, body.len())?;

        Ok(Self {
            source: source.to_owned(),
            body: body.to_owned(),
            flags,
            flag_origins,
        })
    }
}

/// Finds the byte offset (within `rest`) of the delimiter that closes the
/// pattern body, accounting for backslash-escaping and (for bracket pairs)
/// nesting of the open/close pair.
fn find_matching_close(rest: &str, open: char, close: char) -> Option<usize> {
    let nested = open != close;
    let mut depth = 0usize;
    let mut escaped = false;

    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if nested && c == open {
            depth += 1;
            continue;
        }
        if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_slash_delimited() {
        let p = Pattern::parse("/a+/i").unwrap();
        assert_eq!(p.body, "a+");
        assert!(p.flags.contains(Flags::CASE_INSENSITIVE));
    }

    #[test]
    fn splits_bracket_delimited_with_nesting() {
        let p = Pattern::parse("~{args.((?:[^{}]++|(?R))*)}~").unwrap();
        assert_eq!(p.body, "{args.((?:[^{}]++|(?R))*)}");
    }

    #[test]
    fn rejects_unknown_flag() {
        let err = Pattern::parse("/a/q").unwrap_err();
        assert!(matches!(
            err,
            RegexRayError::Syntax {
                kind: SyntaxErrorKind::UnknownFlag,
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_closing_delimiter() {
        assert!(Pattern::parse("/abc").is_err());
    }
}
