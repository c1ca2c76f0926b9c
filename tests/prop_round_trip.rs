//! Round-trip property: `compile(parse(body))` reparses to the same AST
//! shape as `body` itself, for any pattern drawn from the regular fragment.

mod support;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use regexray::{parser, visitor};

const REGRESS_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/_proptest-regressions/prop_round_trip");

fn shape(node: &regexray::ast::Node) -> String {
    format!("{:?}", node.kind)
        .split(['(', '{'])
        .next()
        .unwrap_or("")
        .to_string()
}

fn shapes(node: &regexray::ast::Node, out: &mut Vec<String>) {
    out.push(shape(node));
    use regexray::ast::NodeKind::*;
    match &node.kind {
        Literal { .. } | CharClass { .. } | Anchor(_) | Backref(_) | Recursion(_) => {}
        Group { child, .. } | Assertion { child, .. } | Quantifier { child, .. } => {
            shapes(child, out)
        }
        Alternation { branches } => branches.iter().for_each(|b| shapes(b, out)),
        Sequence(children) => children.iter().for_each(|c| shapes(c, out)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(64),
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct(REGRESS_DIR))),
        ..ProptestConfig::default()
    })]

    #[test]
    fn compile_then_reparse_preserves_ast_shape(body in support::regular_body()) {
        let parsed = parser::parse(&body).unwrap();
        let source = visitor::compile(&parsed.root);
        let reparsed = parser::parse(&source).unwrap();

        let mut before = Vec::new();
        let mut after = Vec::new();
        shapes(&parsed.root, &mut before);
        shapes(&reparsed.root, &mut after);
        prop_assert_eq!(before, after);
    }
}
