//! DFA-specific wrapper: total transitions via a single dead-state sink,
//! BFS-canonical state numbering, and the structural hash used as the DFA
//! cache key (`spec.md` §4.8).
//!
//! Grounded on the teacher's `FiniteStateMachine::compute_dfa`/`minimal`
//! (reused as-is from `fsm.rs`); the canonicalization and hashing are new,
//! since the teacher never needed a cache key (it runs matches directly).

use std::collections::{BTreeMap, VecDeque};

use sha2::{Digest, Sha256};

use crate::alphabet::{Alphabet, Interval, CODE_POINT_CEILING};
use crate::error::{ComplexityErrorKind, RegexRayError, Result};
use crate::fsm::FiniteStateMachine;
use crate::limits::Limits;

pub type StateId = usize;

/// A minimized DFA with a total transition function: every state has
/// exactly one outgoing edge per alphabet symbol, absences filled by
/// `dead`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dfa {
    pub num_states: usize,
    pub alphabet: Vec<Interval>,
    pub transitions: BTreeMap<(StateId, usize), StateId>,
    pub start: StateId,
    pub accept: Vec<bool>,
    pub dead: StateId,
}

impl Dfa {
    /// Determinizes and minimizes `nfa` (Thompson-built over `alphabet`)
    /// into a totalized, canonically-numbered DFA.
    pub fn build(nfa: FiniteStateMachine<Interval>, alphabet: &Alphabet, limits: &Limits) -> Result<Self> {
        let minimal = nfa.compute_dfa_bounded(limits.max_dfa_states)?.minimal();
        if minimal.num_states() > limits.max_dfa_states {
            return Err(RegexRayError::complexity(
                ComplexityErrorKind::TooManyDfaStates,
                limits.max_dfa_states,
            ));
        }
        Ok(Self::totalize_and_canonicalize(minimal, alphabet))
    }

    fn totalize_and_canonicalize(fsm: FiniteStateMachine<Interval>, alphabet: &Alphabet) -> Self {
        let symbols = alphabet.symbols();
        let old_start = *fsm.starts().next().expect("a DFA always has exactly one start state");

        // BFS from the start state to assign canonical ids and discover
        // reachable states; unreachable states were already pruned by
        // `compute_dfa`, so this also serves as a stable renumbering.
        let mut order = Vec::new();
        let mut remap: BTreeMap<StateId, StateId> = BTreeMap::new();
        let mut queue = VecDeque::new();
        remap.insert(old_start, 0);
        order.push(old_start);
        queue.push_back(old_start);

        while let Some(old) = queue.pop_front() {
            for sym in &symbols {
                if let Some(next) = fsm.lookup(old, sym).next() {
                    if !remap.contains_key(next) {
                        let id = order.len();
                        remap.insert(*next, id);
                        order.push(*next);
                        queue.push_back(*next);
                    }
                }
            }
        }

        let dead = order.len();
        let num_states = order.len() + 1;

        let mut accept = vec![false; num_states];
        for (old, new) in remap.iter() {
            accept[*new] = fsm.is_accepting(*old);
        }

        let mut transitions = BTreeMap::new();
        for (old, new) in remap.iter() {
            for (sym_idx, sym) in symbols.iter().enumerate() {
                let target = fsm
                    .lookup(*old, sym)
                    .next()
                    .and_then(|t| remap.get(t))
                    .copied()
                    .unwrap_or(dead);
                transitions.insert((*new, sym_idx), target);
            }
        }
        for sym_idx in 0..symbols.len() {
            transitions.insert((dead, sym_idx), dead);
        }

        Self {
            num_states,
            alphabet: symbols,
            transitions,
            start: 0,
            accept,
            dead,
        }
    }

    pub fn step(&self, state: StateId, sym_idx: usize) -> StateId {
        self.transitions.get(&(state, sym_idx)).copied().unwrap_or(self.dead)
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept.get(state).copied().unwrap_or(false)
    }

    /// The index of the (unique, by construction) alphabet symbol whose
    /// interval contains the raw codepoint `value`. `self.alphabet` always
    /// partitions the full `[0, CODE_POINT_CEILING)` domain, so this never
    /// needs an external `Alphabet` to resolve -- two `Dfa`s built from
    /// different patterns can each answer this for the same `char`.
    fn symbol_index_containing(&self, value: u32) -> usize {
        self.alphabet
            .iter()
            .position(|iv| iv.start <= value && value < iv.end)
            .expect("a Dfa's alphabet always partitions the full codepoint domain")
    }

    /// `^`/`\A`-style anchors are modeled as a real transition over a
    /// `⟨start⟩` sentinel symbol consumed before the first character
    /// (`spec.md` §4.7; see `nfa::anchor_fsm`). A `Dfa` built from a
    /// pattern with no such anchor never has that symbol in its alphabet,
    /// so this is a no-op for unanchored patterns.
    pub fn effective_start(&self) -> StateId {
        match self.alphabet.iter().position(|iv| iv.is_start_of_string()) {
            Some(idx) => self.step(self.start, idx),
            None => self.start,
        }
    }

    /// A state counts as a match end if it's accepting outright, or if
    /// consuming the `⟨end⟩` sentinel from it lands on an accepting state
    /// (the mirror of [`Self::effective_start`] for `$`/`\z`-style anchors).
    pub fn accepts_at(&self, state: StateId) -> bool {
        if self.is_accepting(state) {
            return true;
        }
        match self.alphabet.iter().position(|iv| iv.is_end_of_string()) {
            Some(idx) => self.is_accepting(self.step(state, idx)),
            None => false,
        }
    }

    /// Feeds `chars` through the DFA, consuming the `⟨start⟩`/`⟨end⟩`
    /// sentinels implicitly at the boundaries, and returns whether the walk
    /// ends in a match state.
    pub fn accepts(&self, chars: impl Iterator<Item = char>) -> bool {
        let mut state = self.effective_start();
        for c in chars {
            let idx = self.symbol_index_containing(c as u32);
            state = self.step(state, idx);
            if state == self.dead {
                return false;
            }
        }
        self.accepts_at(state)
    }

    /// A structural hash stable across two DFAs recognizing the same
    /// language and built from the same alphabet, used for the DFA cache key
    /// (`spec.md` §4.8: `hash(body, effective_flags_excluding_useless)`
    /// folds this in).
    pub fn structural_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.num_states.to_le_bytes());
        hasher.update(self.start.to_le_bytes());
        hasher.update(self.dead.to_le_bytes());
        for iv in &self.alphabet {
            hasher.update(iv.start.to_le_bytes());
            hasher.update(iv.end.to_le_bytes());
        }
        for (state, is_accept) in self.accept.iter().enumerate() {
            if *is_accept {
                hasher.update(state.to_le_bytes());
            }
        }
        for ((state, sym), target) in &self.transitions {
            hasher.update(state.to_le_bytes());
            hasher.update(sym.to_le_bytes());
            hasher.update(target.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa;
    use crate::parser;
    use crate::pattern::Flags;

    fn dfa_for(body: &str) -> (Dfa, Alphabet) {
        let parsed = parser::parse(body).unwrap();
        let (nfa, alphabet) = nfa::build_nfa(&parsed.root, Flags::empty(), &Limits::default()).unwrap();
        let dfa = Dfa::build(nfa, &alphabet, &Limits::default()).unwrap();
        (dfa, alphabet)
    }

    #[test]
    fn transition_function_is_total() {
        let (dfa, _) = dfa_for("ab");
        for state in 0..dfa.num_states {
            for sym in 0..dfa.alphabet.len() {
                assert!(dfa.transitions.contains_key(&(state, sym)));
            }
        }
    }

    #[test]
    fn accepts_matches_exact_literal() {
        let (dfa, _alphabet) = dfa_for("cat");
        assert!(dfa.accepts("cat".chars()));
        assert!(!dfa.accepts("cats".chars()));
        assert!(!dfa.accepts("ca".chars()));
    }

    #[test]
    fn anchored_pattern_consumes_sentinels_at_the_boundary() {
        let (dfa, _) = dfa_for(r"^cat$");
        assert!(dfa.accepts("cat".chars()));
        assert!(!dfa.accepts("cats".chars()));
        assert!(!dfa.accepts("concatenate".chars()));
    }

    #[test]
    fn structural_hash_is_deterministic() {
        let (dfa1, _) = dfa_for("a|b");
        let (dfa2, _) = dfa_for("b|a");
        assert_eq!(dfa1.structural_hash(), dfa2.structural_hash());
    }

    #[test]
    fn structural_hash_differs_for_different_languages() {
        let (dfa1, _) = dfa_for("a");
        let (dfa2, _) = dfa_for("b");
        assert_ne!(dfa1.structural_hash(), dfa2.structural_hash());
    }

    #[test]
    fn rejects_state_explosion_over_limit() {
        let parsed = parser::parse("a{0,50}").unwrap();
        let tight = Limits::default().with_max_dfa_states(5);
        let (nfa, alphabet) = nfa::build_nfa(&parsed.root, Flags::empty(), &tight).unwrap();
        assert!(Dfa::build(nfa, &alphabet, &tight).is_err());
    }
}
