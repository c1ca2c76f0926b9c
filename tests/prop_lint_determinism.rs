//! The lint engine must be a pure function of its input: analyzing the same
//! source twice (through independent `Pipeline`s, so neither cache nor
//! shared state can be doing the work) always yields the same issue set.

mod support;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use regexray::Pipeline;

const REGRESS_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/_proptest-regressions/prop_lint_determinism");

proptest! {
    #![proptest_config(ProptestConfig {
        cases: std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(64),
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct(REGRESS_DIR))),
        ..ProptestConfig::default()
    })]

    #[test]
    fn analyze_is_deterministic(source in support::regular_source()) {
        let a = Pipeline::uncached(Default::default()).analyze(&source).unwrap();
        let b = Pipeline::uncached(Default::default()).analyze(&source).unwrap();
        prop_assert_eq!(a.lint_issues, b.lint_issues);
        prop_assert_eq!(a.stats, b.stats);
    }
}
