//! Algebraic identities the solver must satisfy for any pair of patterns
//! drawn from the regular fragment: reflexivity/self-equivalence of
//! `subset_of`/`equivalent`, and the `A ⊆ A|B` containment every
//! alternation branch has over its parent.

mod support;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use regexray::Pipeline;

const REGRESS_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/_proptest-regressions/prop_solver_identities");

proptest! {
    #![proptest_config(ProptestConfig {
        cases: std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(48),
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct(REGRESS_DIR))),
        ..ProptestConfig::default()
    })]

    #[test]
    fn a_pattern_is_a_subset_of_and_equivalent_to_itself(source in support::regular_source()) {
        let pipeline = Pipeline::uncached(Default::default());
        prop_assert!(pipeline.subset_of(&source, &source).unwrap().holds);
        prop_assert!(pipeline.equivalent(&source, &source).unwrap().equivalent);
    }

    #[test]
    fn either_branch_of_an_alternation_is_a_subset_of_it(
        a in support::regular_body(),
        b in support::regular_body(),
    ) {
        let pipeline = Pipeline::uncached(Default::default());
        let whole = format!("/(?:{a}|{b})/");
        let left = format!("/{a}/");
        let right = format!("/{b}/");
        prop_assert!(pipeline.subset_of(&left, &whole).unwrap().holds);
        prop_assert!(pipeline.subset_of(&right, &whole).unwrap().holds);
    }

    #[test]
    fn equivalence_is_symmetric(
        a in support::regular_source(),
        b in support::regular_source(),
    ) {
        let pipeline = Pipeline::uncached(Default::default());
        let a_eq_b = pipeline.equivalent(&a, &b).unwrap().equivalent;
        let b_eq_a = pipeline.equivalent(&b, &a).unwrap().equivalent;
        prop_assert_eq!(a_eq_b, b_eq_a);
    }
}
