//! Every optimizer rewrite must preserve the pattern's language: re-emitting
//! the optimized AST as source and comparing its DFA against the original's
//! must always report `equivalent`.

mod support;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use regexray::optimizer::Optimizer;
use regexray::pattern::Pattern;
use regexray::{parser, solver, visitor};
use regexray::limits::Limits;
use regexray::{dfa::Dfa, nfa, subset_validator};

const REGRESS_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/_proptest-regressions/prop_optimizer_preserves_language");

fn build_dfa(body: &regexray::ast::Node, flags: regexray::pattern::Flags, limits: &Limits) -> Dfa {
    let (fsm, alphabet) = nfa::build_nfa(body, flags, limits).unwrap();
    Dfa::build(fsm, &alphabet, limits).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(48),
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct(REGRESS_DIR))),
        ..ProptestConfig::default()
    })]

    #[test]
    fn optimized_source_recognizes_the_same_language(source in support::regular_source()) {
        let pattern = Pattern::parse(&source).unwrap();
        let parsed = parser::parse(&pattern.body).unwrap();
        subset_validator::validate(&parsed.root).unwrap();

        let limits = Limits::default();
        let original_dfa = build_dfa(&parsed.root, pattern.flags, &limits);

        let (optimized, _suggestions) = Optimizer::optimize(parsed.root, pattern.flags);
        subset_validator::validate(&optimized).unwrap();
        let optimized_dfa = build_dfa(&optimized, pattern.flags, &limits);

        let result = solver::equivalent(&original_dfa, &optimized_dfa, &limits).unwrap();
        prop_assert!(result.equivalent, "optimizer changed the language of {source:?}: only_in_original={:?} only_in_optimized={:?}", result.only_in_a, result.only_in_b);

        // The rewrite must also still round-trip through the compiler.
        let _ = visitor::compile(&optimized);
    }
}
