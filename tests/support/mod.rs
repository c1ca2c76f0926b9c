//! Shared proptest strategies for generating small, always-well-formed
//! regular-fragment patterns: literals, classes, alternation, concatenation
//! and bounded quantifiers over a tiny alphabet, with no backreferences,
//! lookaround, or recursion so every generated pattern builds a DFA cleanly.

use proptest::prelude::*;

/// A PCRE-style pattern body (no delimiters/flags), restricted to the
/// regular fragment so it's always accepted by `subset_validator`.
pub fn regular_body() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just("[ab]".to_string()),
        Just("[a-c]".to_string()),
        Just(".".to_string()),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            // concatenation of 2-3 sub-patterns
            prop::collection::vec(inner.clone(), 2..=3)
                .prop_map(|parts| parts.join("")),
            // alternation of 2 branches
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("(?:{a}|{b})")),
            // bounded quantifier
            inner.clone().prop_map(|a| format!("(?:{a}){{0,3}}")),
            inner.clone().prop_map(|a| format!("(?:{a})?")),
        ]
    })
}

/// Wraps a body in `/.../ ` with no flags -- the simplest valid source form
/// `pattern::Pattern::parse` accepts.
pub fn regular_source() -> impl Strategy<Value = String> {
    regular_body().prop_map(|body| format!("/{body}/"))
}
