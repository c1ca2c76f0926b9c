//! A generic finite state machine: NFA construction primitives (`join`,
//! `then`, `then_loop`), epsilon elimination, Hopcroft-equivalent subset
//! construction (`compute_dfa`, via the powerset method) and Brzozowski
//! minimization (`minimal`).
//!
//! Ported from the teacher's `automata::fsm::FiniteStateMachine`, kept
//! generic over the edge symbol type `S`, a per-state tag type `T` (used to
//! mark group-boundary events during NFA construction) and a transducer
//! output type `O` (merged along epsilon-closures so capture-group events
//! survive epsilon elimination).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::ops::Bound::Included;

use crate::disjoint_sets::DisjointSets;
use crate::error::{ComplexityErrorKind, RegexRayError, Result};

pub type StateId = usize;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EdgeSymbol<S> {
    Value(S),
    Epsilon,
}

/// A transducer output attached to an edge. Must be mergeable so that
/// epsilon elimination can fold an edge's output together with whatever an
/// epsilon-reachable successor contributes.
pub trait OutputSymbol: Default {
    fn merge(&mut self, other: &Self);
}

impl OutputSymbol for () {
    fn merge(&mut self, _other: &Self) {}
}

impl<T: Eq + Hash + Clone> OutputSymbol for HashSet<T> {
    fn merge(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FiniteStateMachine<S, T = (), O = ()>
where
    S: Eq + Hash + Ord + Clone,
    T: Eq + Hash,
    O: OutputSymbol,
{
    num_states: StateId,
    state_tags: Vec<HashSet<T>>,
    starting_states: HashSet<StateId>,
    accepting_states: HashSet<StateId>,
    transitions: BTreeMap<(StateId, EdgeSymbol<S>, StateId), O>,
}

impl<S, T, O> FiniteStateMachine<S, T, O>
where
    S: 'static + Clone + Eq + Ord + Hash + std::fmt::Debug,
    T: Eq + Hash + Clone,
    O: 'static + OutputSymbol + Clone,
{
    pub fn new() -> Self {
        Self {
            num_states: 0,
            state_tags: Vec::new(),
            starting_states: HashSet::new(),
            accepting_states: HashSet::new(),
            transitions: BTreeMap::new(),
        }
    }

    /// The machine accepting exactly the empty string.
    pub fn zero() -> Self {
        let mut a = Self::new();
        let s = a.add_state();
        a.mark_start(s);
        a.mark_accept(s);
        a
    }

    pub fn add_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.state_tags.push(HashSet::new());
        id
    }

    pub fn add_tag(&mut self, state: StateId, tag: T) {
        self.state_tags[state].insert(tag);
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn starts(&self) -> impl Iterator<Item = &StateId> {
        self.starting_states.iter()
    }

    pub fn acceptors(&self) -> impl Iterator<Item = &StateId> {
        self.accepting_states.iter()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting_states.contains(&state)
    }

    pub fn mark_start(&mut self, state: StateId) {
        self.starting_states.insert(state);
    }

    pub fn mark_accept(&mut self, state: StateId) {
        self.accepting_states.insert(state);
    }

    pub fn add_transition(&mut self, from: StateId, sym: S, to: StateId) {
        self.add_transition_with_output(from, sym, to, O::default());
    }

    pub fn add_transition_with_output(&mut self, from: StateId, sym: S, to: StateId, output: O) {
        self.transitions
            .insert((from, EdgeSymbol::Value(sym), to), output);
    }

    pub fn add_epsilon_with_output(&mut self, from: StateId, to: StateId, output: O) {
        self.transitions.insert((from, EdgeSymbol::Epsilon, to), output);
    }

    pub fn lookup(&self, from: StateId, sym: &S) -> impl Iterator<Item = &StateId> {
        self.lookup_edge(from, EdgeSymbol::Value(sym.clone())).map(|(to, _)| to)
    }

    pub fn lookup_with_output(&self, from: StateId, sym: &S) -> impl Iterator<Item = (&StateId, &O)> {
        self.lookup_edge(from, EdgeSymbol::Value(sym.clone()))
    }

    fn lookup_edge(&self, from: StateId, sym: EdgeSymbol<S>) -> impl Iterator<Item = (&StateId, &O)> {
        self.transitions
            .range((
                Included((from, sym.clone(), 0)),
                Included((from, sym.clone(), StateId::MAX)),
            ))
            .map(|((_, _, to), output)| (to, output))
    }

    /// Merges `other`'s states/transitions into `self` with an offset so ids
    /// stay disjoint, but does NOT connect the two machines: used to build
    /// alternation (the two sets of start/accept states both remain active).
    pub fn join(&mut self, mut other: Self) {
        let offset = self.num_states;
        self.num_states += other.num_states;
        self.state_tags.append(&mut other.state_tags);

        for id in other.starting_states {
            self.starting_states.insert(id + offset);
        }
        for id in other.accepting_states {
            self.accepting_states.insert(id + offset);
        }
        for ((i, s, j), v) in other.transitions {
            self.transitions.insert((i + offset, s, j + offset), v);
        }
    }

    /// Chains `other` after `self`: epsilon-connects every accepting state of
    /// `self` to every starting state of `other`, then adopts `other`'s
    /// accepting states. Builds concatenation.
    pub fn then(&mut self, mut other: Self) {
        let offset = self.num_states;
        self.num_states += other.num_states;
        self.state_tags.append(&mut other.state_tags);

        for j in other.starting_states {
            for i in self.accepting_states.iter() {
                self.transitions
                    .insert((*i, EdgeSymbol::Epsilon, j + offset), O::default());
            }
        }

        self.accepting_states.clear();
        for id in other.accepting_states {
            self.accepting_states.insert(id + offset);
        }
        for ((i, s, j), o) in other.transitions {
            self.transitions.insert((i + offset, s, j + offset), o);
        }
    }

    /// Adds epsilon back-edges from every accepting state to every starting
    /// state: turns `A` into `A+`.
    pub fn then_loop(&mut self) {
        for i in self.accepting_states.clone() {
            for j in self.starting_states.clone() {
                self.transitions
                    .insert((i, EdgeSymbol::Epsilon, j), O::default());
            }
        }
    }

    /// Collapses to exactly one starting state via a fresh epsilon hub.
    pub fn with_single_start(mut self) -> Self {
        if self.starting_states.len() == 1 {
            return self;
        }
        let s = self.add_state();
        for si in self.starting_states.clone() {
            self.transitions.insert((s, EdgeSymbol::Epsilon, si), O::default());
        }
        self.starting_states.clear();
        self.starting_states.insert(s);
        self
    }

    fn has_epsilon(&self) -> bool {
        self.transitions.keys().any(|(_, s, _)| matches!(s, EdgeSymbol::Epsilon))
    }

    pub fn used_symbols(&self) -> Vec<S> {
        let mut set = BTreeSet::new();
        for (_, s, _) in self.transitions.keys() {
            if let EdgeSymbol::Value(v) = s {
                set.insert(v.clone());
            }
        }
        set.into_iter().collect()
    }

    /// Removes epsilon transitions by merging each epsilon-closure into a
    /// single state (ported from the teacher's union-find based approach).
    pub fn without_epsilons(self) -> Self {
        if !self.has_epsilon() {
            return self;
        }

        let mut closures = DisjointSets::new(self.num_states);
        for i in 0..self.num_states {
            for (j, _) in self.lookup_edge(i, EdgeSymbol::Epsilon) {
                closures.union_sets(i, *j);
            }
        }

        let epsilon_outputs = self.epsilon_outputs();

        let mut new_num_states = 0;
        let mut new_state_tags: Vec<HashSet<T>> = Vec::new();
        let mut state_mapping = Vec::with_capacity(self.num_states);

        for (i, tags) in (0..self.num_states).zip(self.state_tags.iter().cloned()) {
            let c = closures.find_set_min(i);
            if c < i {
                let repr = state_mapping[c];
                state_mapping.push(repr);
                for tag in tags {
                    new_state_tags[repr].insert(tag);
                }
            } else {
                let id = new_num_states;
                new_num_states += 1;
                new_state_tags.push(tags);
                state_mapping.push(id);
            }
        }

        let new_accepting = self.accepting_states.iter().map(|s| state_mapping[*s]).collect();
        let new_starting = self.starting_states.iter().map(|s| state_mapping[*s]).collect();

        let mut new_transitions = BTreeMap::<_, O>::new();
        for ((i, s, j), mut o) in self.transitions.into_iter() {
            if let EdgeSymbol::Epsilon = s {
                continue;
            }
            if let Some(eo) = epsilon_outputs.get(&j) {
                o.merge(eo);
            }
            let key = (state_mapping[i], s, state_mapping[j]);
            new_transitions
                .entry(key)
                .and_modify(|existing| existing.merge(&o))
                .or_insert(o);
        }

        Self {
            num_states: new_num_states,
            state_tags: new_state_tags,
            starting_states: new_starting,
            accepting_states: new_accepting,
            transitions: new_transitions,
        }
    }

    fn epsilon_outputs(&self) -> HashMap<StateId, O> {
        let mut outputs = HashMap::new();
        for i in 0..self.num_states {
            self.epsilon_outputs_for(i, &mut outputs);
        }
        outputs
    }

    fn epsilon_outputs_for<'a>(&self, s: StateId, outputs: &'a mut HashMap<StateId, O>) -> &'a O {
        if !outputs.contains_key(&s) {
            outputs.insert(s, O::default()); // breaks cycles.
            let mut acc = O::default();
            for (next, o) in self.lookup_edge(s, EdgeSymbol::Epsilon) {
                acc.merge(o);
                let next = *next;
                let next_outputs = self.epsilon_outputs_for(next, outputs);
                acc.merge(next_outputs);
            }
            outputs.insert(s, acc);
        }
        outputs.get(&s).unwrap()
    }

    /// Accepts iff the path spelled out by `input` ends in an accepting
    /// state; rejects on any symbol this machine has no transition for.
    /// Assumes `self` is already a DFA.
    pub fn accepts<I: Iterator<Item = S>>(&self, input: I) -> bool {
        let mut state = match self.starting_states.iter().next() {
            Some(s) => *s,
            None => return false,
        };
        for v in input {
            match self.lookup(state, &v).next() {
                Some(next) => state = *next,
                None => return false,
            }
        }
        self.accepting_states.contains(&state)
    }

    pub fn tags(&self, state: StateId) -> &HashSet<T> {
        &self.state_tags[state]
    }

    /// Subset construction (powerset method): produces a DFA with exactly
    /// one transition per alphabet symbol per state. Unreachable states are
    /// pruned as a side effect of only ever visiting reachable powersets.
    pub fn compute_dfa(self) -> Self {
        self.compute_dfa_bounded(usize::MAX).expect("unbounded compute_dfa never fails")
    }

    pub fn compute_dfa_bounded(self, max_states: usize) -> Result<Self> {
        let mut this = self.with_single_start().without_epsilons();
        let alphabet = this.used_symbols();

        let mut new_starting = HashSet::new();
        new_starting.insert(0);
        let mut new_accepting = HashSet::new();

        let mut new_states: Vec<Vec<StateId>> = Vec::new();
        let mut new_states_idx: HashMap<Vec<StateId>, usize> = HashMap::new();
        let mut new_transitions = BTreeMap::<_, O>::new();

        let initial = vec![*this.starting_states.iter().next().unwrap()];
        new_states.push(initial.clone());
        new_states_idx.insert(initial.clone(), 0);
        if initial.iter().any(|s| this.accepting_states.contains(s)) {
            new_accepting.insert(0);
        }

        let mut queue = vec![0usize];
        while let Some(cur_id) = queue.pop() {
            if new_states.len() > max_states {
                return Err(RegexRayError::complexity(
                    ComplexityErrorKind::TooManyDfaStates,
                    max_states,
                ));
            }

            for sym in alphabet.iter() {
                let mut next_accepts = false;
                let mut next_output = O::default();
                let next_set: Vec<StateId> = {
                    let mut set = BTreeSet::new();
                    for state in new_states[cur_id].iter() {
                        for (next, output) in this.lookup_edge(*state, EdgeSymbol::Value(sym.clone())) {
                            if this.accepting_states.contains(next) {
                                next_accepts = true;
                            }
                            set.insert(*next);
                            next_output.merge(output);
                        }
                    }
                    set.into_iter().collect()
                };

                let next_id = if let Some(id) = new_states_idx.get(&next_set) {
                    *id
                } else {
                    let id = new_states.len();
                    new_states.push(next_set.clone());
                    new_states_idx.insert(next_set, id);
                    if next_accepts {
                        new_accepting.insert(id);
                    }
                    queue.push(id);
                    id
                };

                let key = (cur_id, EdgeSymbol::Value(sym.clone()), next_id);
                new_transitions
                    .entry(key)
                    .and_modify(|o: &mut O| o.merge(&next_output))
                    .or_insert(next_output);
            }
        }

        let mut new_state_tags = Vec::with_capacity(new_states.len());
        for members in new_states.iter() {
            let mut tags = HashSet::new();
            for s in members {
                for t in this.state_tags[*s].drain() {
                    tags.insert(t);
                }
            }
            new_state_tags.push(tags);
        }

        Ok(Self {
            num_states: new_states.len(),
            state_tags: new_state_tags,
            starting_states: new_starting,
            accepting_states: new_accepting,
            transitions: new_transitions,
        })
    }

    /// The automaton accepting the reverse language.
    pub fn reverse(self) -> Self {
        Self {
            num_states: self.num_states,
            state_tags: self.state_tags,
            starting_states: self.accepting_states,
            accepting_states: self.starting_states,
            transitions: self
                .transitions
                .into_iter()
                .map(|((i, s, j), o)| ((j, s, i), o))
                .collect(),
        }
    }

    /// Brzozowski minimization: reverse + determinize, twice.
    pub fn minimal(self) -> Self {
        self.reverse().compute_dfa().reverse().compute_dfa()
    }
}

impl<S, T, O> Default for FiniteStateMachine<S, T, O>
where
    S: 'static + Clone + Eq + Ord + Hash + std::fmt::Debug,
    T: Eq + Hash + Clone,
    O: 'static + OutputSymbol + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type CharFsm = FiniteStateMachine<char, (), ()>;

    fn literal(c: char) -> CharFsm {
        let mut a = CharFsm::new();
        let s = a.add_state();
        let e = a.add_state();
        a.mark_start(s);
        a.mark_accept(e);
        a.add_transition(s, c, e);
        a
    }

    #[test]
    fn concatenation_accepts_exact_sequence() {
        let mut a = literal('a');
        a.then(literal('b'));
        let dfa = a.compute_dfa();
        assert!(dfa.accepts("ab".chars()));
        assert!(!dfa.accepts("a".chars()));
        assert!(!dfa.accepts("abc".chars()));
    }

    #[test]
    fn alternation_accepts_either_branch() {
        let mut a = literal('a');
        a.join(literal('b'));
        let dfa = a.compute_dfa();
        assert!(dfa.accepts("a".chars()));
        assert!(dfa.accepts("b".chars()));
        assert!(!dfa.accepts("c".chars()));
    }

    #[test]
    fn star_accepts_zero_or_more() {
        let mut a = literal('a');
        a.then_loop();
        a.join(CharFsm::zero());
        let dfa = a.compute_dfa();
        assert!(dfa.accepts("".chars()));
        assert!(dfa.accepts("aaaa".chars()));
        assert!(!dfa.accepts("aab".chars()));
    }

    #[test]
    fn minimal_is_idempotent_up_to_state_count() {
        let mut a = literal('a');
        a.join(literal('a'));
        let min1 = a.minimal();
        let n = min1.num_states();
        let min2 = min1.minimal();
        assert_eq!(min2.num_states(), n);
    }

    #[test]
    fn compute_dfa_bounded_rejects_explosion() {
        let mut a = literal('a');
        for _ in 0..5 {
            a.join(literal('a'));
        }
        assert!(a.compute_dfa_bounded(0).is_err());
    }
}
