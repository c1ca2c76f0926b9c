//! DFA construction is deterministic up to structure: building the same
//! pattern's DFA twice (via independent, uncached pipelines) always yields
//! the same structural hash and the same state count, regardless of
//! incidental alternation-branch ordering inside `minimal()`'s
//! double-reversal.

mod support;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use regexray::Pipeline;

const REGRESS_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/_proptest-regressions/prop_dfa_minimization");

proptest! {
    #![proptest_config(ProptestConfig {
        cases: std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(48),
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct(REGRESS_DIR))),
        ..ProptestConfig::default()
    })]

    #[test]
    fn building_the_same_pattern_twice_is_structurally_stable(source in support::regular_source()) {
        let dfa_a = Pipeline::uncached(Default::default()).build_dfa(&source).unwrap();
        let dfa_b = Pipeline::uncached(Default::default()).build_dfa(&source).unwrap();
        prop_assert_eq!(dfa_a.num_states, dfa_b.num_states);
        prop_assert_eq!(dfa_a.structural_hash(), dfa_b.structural_hash());
    }

    #[test]
    fn swapping_alternation_branch_order_does_not_change_the_minimal_dfa(
        a in support::regular_body(),
        b in support::regular_body(),
    ) {
        let pipeline = Pipeline::uncached(Default::default());
        let forward = pipeline.build_dfa(&format!("/(?:{a}|{b})/")).unwrap();
        let backward = pipeline.build_dfa(&format!("/(?:{b}|{a})/")).unwrap();
        prop_assert_eq!(forward.structural_hash(), backward.structural_hash());
    }
}
