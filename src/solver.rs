//! Language-theoretic queries between two independently-built DFAs
//! (`spec.md` §4.9): intersection emptiness, subset, and equivalence,
//! each answered by a BFS over a synchronized product automaton that also
//! recovers a shortest witness/counter-example string.
//!
//! Grounded on `dfa.rs`'s own `accepts`/`effective_start`/`accepts_at`
//! (single-DFA string walk), generalized here to a pair of DFAs stepped in
//! lockstep over a shared refinement of their two alphabets -- the teacher
//! never needed this since it only ever matches one pattern against one
//! string.

use std::collections::{BTreeSet, VecDeque};

use crate::alphabet::{Alphabet, Interval, CODE_POINT_CEILING};
use crate::dfa::{Dfa, StateId};
use crate::error::{ComplexityErrorKind, RegexRayError, Result};
use crate::limits::Limits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionResult {
    pub empty: bool,
    pub witness: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetResult {
    pub holds: bool,
    pub counter_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceResult {
    pub equivalent: bool,
    pub only_in_a: Option<String>,
    pub only_in_b: Option<String>,
}

/// `L(a) ∩ L(b) = ∅`? BFS the product automaton from both effective starts;
/// the first accept state reached (if any) gives the shortest witness.
pub fn intersection(a: &Dfa, b: &Dfa, limits: &Limits) -> Result<IntersectionResult> {
    let product = Product::new(a, b, limits)?;
    let witness = bfs_shortest(&product, limits, |p, q| a.accepts_at(p) && b.accepts_at(q))?;
    Ok(IntersectionResult {
        empty: witness.is_none(),
        witness,
    })
}

/// `L(a) ⊆ L(b)`, tested as `L(a) ∩ L(¬b) = ∅`. A witness of the
/// intersection is a string `a` matches that `b` doesn't -- the
/// counter-example to the subset claim.
pub fn subset(a: &Dfa, b: &Dfa, limits: &Limits) -> Result<SubsetResult> {
    let not_b = negate(b);
    let inter = intersection(a, &not_b, limits)?;
    Ok(SubsetResult {
        holds: inter.empty,
        counter_example: inter.witness,
    })
}

/// `L(a) = L(b)`, tested as `a ⊆ b ∧ b ⊆ a`. When the two differ, both
/// one-sided counter-examples are reported (one or the other may be absent
/// if the asymmetry only goes one way).
pub fn equivalent(a: &Dfa, b: &Dfa, limits: &Limits) -> Result<EquivalenceResult> {
    let a_sub_b = subset(a, b, limits)?;
    let b_sub_a = subset(b, a, limits)?;
    Ok(EquivalenceResult {
        equivalent: a_sub_b.holds && b_sub_a.holds,
        only_in_a: a_sub_b.counter_example,
        only_in_b: b_sub_a.counter_example,
    })
}

/// A DFA with every acceptance bit flipped, over the same states,
/// transitions and dead sink. Valid because `Dfa`'s transition function is
/// already total: the complement of a total DFA's language is just the
/// states it does *not* accept in.
fn negate(dfa: &Dfa) -> Dfa {
    Dfa {
        num_states: dfa.num_states,
        alphabet: dfa.alphabet.clone(),
        transitions: dfa.transitions.clone(),
        start: dfa.start,
        accept: dfa.accept.iter().map(|accepting| !accepting).collect(),
        dead: dfa.dead,
    }
}

/// The shared alphabet two independently-constructed DFAs must be stepped
/// over together: the union of both DFAs' interval boundaries, refined to a
/// common partition, plus a lookup from each refined symbol back to the
/// single coarser symbol it came from in `a` and in `b`.
struct Product<'a> {
    a: &'a Dfa,
    b: &'a Dfa,
    symbols: Vec<Interval>,
    a_symbol: Vec<usize>,
    b_symbol: Vec<usize>,
}

impl<'a> Product<'a> {
    fn new(a: &'a Dfa, b: &'a Dfa, limits: &Limits) -> Result<Self> {
        let mut alphabet = Alphabet::new();
        alphabet.insert_many(&a.alphabet);
        alphabet.insert_many(&b.alphabet);
        let symbols = alphabet.symbols();

        if symbols.len() > limits.max_alphabet_intervals {
            return Err(RegexRayError::complexity(
                ComplexityErrorKind::TooManyAlphabetIntervals,
                limits.max_alphabet_intervals,
            ));
        }

        let a_symbol = symbols.iter().map(|s| symbol_index_containing(&a.alphabet, s)).collect();
        let b_symbol = symbols.iter().map(|s| symbol_index_containing(&b.alphabet, s)).collect();

        Ok(Self {
            a,
            b,
            symbols,
            a_symbol,
            b_symbol,
        })
    }

    fn step(&self, state: (StateId, StateId), refined_sym: usize) -> (StateId, StateId) {
        (
            self.a.step(state.0, self.a_symbol[refined_sym]),
            self.b.step(state.1, self.b_symbol[refined_sym]),
        )
    }
}

fn symbol_index_containing(alphabet: &[Interval], needle: &Interval) -> usize {
    alphabet
        .iter()
        .position(|iv| iv.start <= needle.start && needle.end <= iv.end)
        .expect("the refined alphabet subdivides each Dfa's own alphabet, never coarsens it")
}

/// Breadth-first search over the product of `a`'s and `b`'s states, starting
/// at each DFA's effective start (past any `⟨start⟩` sentinel) and walking
/// only ordinary character symbols -- `⟨start⟩`/`⟨end⟩` are handled by
/// `effective_start`/`accepts_at` at the boundaries, the same way a single
/// `Dfa::accepts` call does. Returns the shortest string reaching a state
/// for which `accept` holds, or `None` if no such state is reachable.
fn bfs_shortest(
    product: &Product,
    limits: &Limits,
    accept: impl Fn(StateId, StateId) -> bool,
) -> Result<Option<String>> {
    let start = (product.a.effective_start(), product.b.effective_start());
    if accept(start.0, start.1) {
        return Ok(Some(String::new()));
    }

    let body_symbols: Vec<(usize, Interval)> = product
        .symbols
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, iv)| !iv.is_start_of_string() && !iv.is_end_of_string())
        .collect();

    let product_state_budget = limits.max_dfa_states.saturating_mul(limits.max_dfa_states);
    let mut visited = BTreeSet::new();
    visited.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back((start, String::new()));

    while let Some((state, path)) = queue.pop_front() {
        for (sym_idx, iv) in &body_symbols {
            let next = product.step(state, *sym_idx);
            if visited.contains(&next) {
                continue;
            }
            if visited.len() >= product_state_budget {
                return Err(RegexRayError::complexity(
                    ComplexityErrorKind::TooManyProductStates,
                    product_state_budget,
                ));
            }
            visited.insert(next);

            let mut next_path = path.clone();
            if let Some(c) = representative_char(*iv) {
                next_path.push(c);
            }

            if accept(next.0, next.1) {
                return Ok(Some(next_path));
            }
            queue.push_back((next, next_path));
        }
    }

    Ok(None)
}

/// A concrete char from `iv`'s range, for rendering a witness string.
/// `None` for sentinel symbols, which consume no character. Scans forward
/// from `iv.start` since an interval gathered from class/range boundaries
/// can straddle the UTF-16 surrogate gap, which has no valid `char`.
fn representative_char(iv: Interval) -> Option<char> {
    if iv.start >= CODE_POINT_CEILING {
        return None;
    }
    (iv.start..iv.end.min(CODE_POINT_CEILING)).find_map(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa;
    use crate::parser;
    use crate::pattern::Flags;

    fn dfa_for(body: &str) -> Dfa {
        let parsed = parser::parse(body).unwrap();
        let (fsm, alphabet) = nfa::build_nfa(&parsed.root, Flags::empty(), &Limits::default()).unwrap();
        Dfa::build(fsm, &alphabet, &Limits::default()).unwrap()
    }

    #[test]
    fn intersection_of_disjoint_languages_is_empty() {
        let a = dfa_for("^abc$");
        let b = dfa_for("^abd$");
        let result = intersection(&a, &b, &Limits::default()).unwrap();
        assert!(result.empty);
        assert!(result.witness.is_none());
    }

    #[test]
    fn intersection_of_overlapping_languages_has_witness() {
        let a = dfa_for("a.*");
        let b = dfa_for(".*z");
        let result = intersection(&a, &b, &Limits::default()).unwrap();
        assert!(!result.empty);
        let witness = result.witness.unwrap();
        assert!(witness.starts_with('a'));
        assert!(witness.ends_with('z'));
    }

    #[test]
    fn subset_holds_for_literal_inside_alternation() {
        let a = dfa_for("a");
        let b = dfa_for("a|b");
        let result = subset(&a, &b, &Limits::default()).unwrap();
        assert!(result.holds);
        assert!(result.counter_example.is_none());
    }

    #[test]
    fn subset_fails_with_counter_example() {
        let a = dfa_for("a|b");
        let b = dfa_for("a");
        let result = subset(&a, &b, &Limits::default()).unwrap();
        assert!(!result.holds);
        assert_eq!(result.counter_example.as_deref(), Some("b"));
    }

    #[test]
    fn equivalent_alternations_regardless_of_branch_order() {
        let a = dfa_for("a|b");
        let b = dfa_for("b|a");
        let result = equivalent(&a, &b, &Limits::default()).unwrap();
        assert!(result.equivalent);
        assert!(result.only_in_a.is_none());
        assert!(result.only_in_b.is_none());
    }

    #[test]
    fn inequivalent_patterns_report_both_sides() {
        let a = dfa_for("a|b");
        let b = dfa_for("a|c");
        let result = equivalent(&a, &b, &Limits::default()).unwrap();
        assert!(!result.equivalent);
        assert_eq!(result.only_in_a.as_deref(), Some("b"));
        assert_eq!(result.only_in_b.as_deref(), Some("c"));
    }
}
