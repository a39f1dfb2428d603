use std::collections::VecDeque;

use bit_set::BitSet;
use itertools::Itertools;

use crate::{
    alphabet::{Alphabet, Symbol},
    error::Result,
    math::OrderedMap,
    regex::{to_postfix, Postfix},
    Show, StateId,
};

/// Thompson's construction of NFAs from postfix sequences.
pub mod thompson;

/// A set of NFA states, the ids index into the arena of the [`Nfa`].
pub type StateSet = BitSet;

/// A state of an [`Nfa`]. It maps every symbol on one of its outgoing edges to the
/// set of targets, epsilon included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfaState {
    transitions: OrderedMap<Symbol, StateSet>,
}

impl NfaState {
    /// Returns the targets reached on `symbol`, if there are any.
    pub fn targets(&self, symbol: &Symbol) -> Option<&StateSet> {
        self.transitions.get(symbol)
    }

    /// Iterates over all outgoing transitions grouped by their symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&Symbol, &StateSet)> + '_ {
        self.transitions.iter()
    }

    pub(crate) fn add_transition(&mut self, symbol: Symbol, target: StateId) {
        self.transitions.entry(symbol).or_default().insert(target);
    }
}

/// A nondeterministic finite automaton with epsilon transitions, as produced by
/// [`thompson::build`]. All states live in one arena and refer to each other by index,
/// so cycles are no problem. There is a single start state and a single accepting state,
/// a state accepts precisely if it is the designated accept state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    pub(crate) fn from_parts(states: Vec<NfaState>, start: StateId, accept: StateId) -> Self {
        Self {
            states,
            start,
            accept,
        }
    }

    /// Runs Thompson's construction on the given postfix sequence.
    pub fn from_postfix(postfix: &Postfix) -> Result<Self> {
        thompson::build(postfix)
    }

    /// Converts `pattern` to postfix and builds the corresponding NFA.
    ///
    /// ```
    /// use thompson::prelude::*;
    ///
    /// let nfa = Nfa::from_regex("ab*").unwrap();
    /// assert!(nfa.accepts("abbb"));
    /// assert_eq!(Nfa::from_regex(")(").unwrap_err(), Error::MalformedExpression);
    /// ```
    pub fn from_regex(pattern: &str) -> Result<Self> {
        Self::from_postfix(&to_postfix(pattern)?)
    }

    /// The number of states in the arena.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The unique accepting state.
    pub fn accept(&self) -> StateId {
        self.accept
    }

    /// Returns true if and only if `state` is the accept state.
    pub fn is_accepting(&self, state: StateId) -> bool {
        state == self.accept
    }

    /// Gives a reference to the state with index `state`, if it exists.
    pub fn state(&self, state: StateId) -> Option<&NfaState> {
        self.states.get(state)
    }

    /// Iterates over the indices of all states.
    pub fn state_indices(&self) -> std::ops::Range<StateId> {
        0..self.states.len()
    }

    /// Iterates over all transitions leaving `state` as `(symbol, target)` pairs.
    pub fn edges_from(&self, state: StateId) -> impl Iterator<Item = (&Symbol, StateId)> + '_ {
        self.states
            .get(state)
            .into_iter()
            .flat_map(|q| q.transitions())
            .flat_map(|(symbol, targets)| targets.iter().map(move |p| (symbol, p)))
    }

    /// Computes all states reachable from `states` through zero or more epsilon transitions.
    /// This uses an explicit work stack, so deep chains of epsilon transitions cannot
    /// overflow the call stack.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut stack = states.iter().collect_vec();

        while let Some(q) = stack.pop() {
            let Some(targets) = self.state(q).and_then(|s| s.targets(&Symbol::Epsilon)) else {
                continue;
            };
            for p in targets {
                if closure.insert(p) {
                    stack.push(p);
                }
            }
        }
        closure
    }

    /// Returns the union of all targets that the states in `states` reach on `symbol`.
    /// No epsilon transitions are followed, neither before nor after the move.
    pub fn move_on(&self, states: &StateSet, symbol: &Symbol) -> StateSet {
        let mut reached = StateSet::with_capacity(self.size());
        for q in states {
            if let Some(targets) = self.state(q).and_then(|s| s.targets(symbol)) {
                reached.union_with(targets);
            }
        }
        reached
    }

    /// The epsilon closure of the start state.
    pub fn initial_closure(&self) -> StateSet {
        let mut start = StateSet::with_capacity(self.size());
        start.insert(self.start);
        self.epsilon_closure(&start)
    }

    /// Collects every non-epsilon symbol that labels a transition reachable from the
    /// start state.
    pub fn alphabet(&self) -> Alphabet {
        let mut alphabet = Alphabet::new();
        let mut seen = StateSet::with_capacity(self.size());
        let mut queue = VecDeque::from([self.start]);
        seen.insert(self.start);

        while let Some(q) = queue.pop_front() {
            for (symbol, p) in self.edges_from(q) {
                alphabet.insert(symbol.clone());
                if seen.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        alphabet
    }
}

impl Show for Nfa {
    fn show(&self) -> String {
        let symbols = std::iter::once(Symbol::Epsilon)
            .chain(self.alphabet().universe().cloned())
            .collect_vec();

        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(symbols.iter().map(|s| s.show())),
        );
        for q in self.state_indices() {
            let mut row = vec![match (q == self.start, self.is_accepting(q)) {
                (true, true) => format!("→{}*", q.show()),
                (true, false) => format!("→{}", q.show()),
                (false, true) => format!("{}*", q.show()),
                (false, false) => q.show(),
            }];
            for symbol in &symbols {
                row.push(
                    self.states[q]
                        .targets(symbol)
                        .map_or("-".to_string(), |targets| targets.show()),
                );
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn set<const N: usize>(states: [StateId; N]) -> StateSet {
        states.into_iter().collect()
    }

    #[test_log::test]
    fn epsilon_closure_follows_chains() {
        // "a*" is built as 0 -a-> 1 wrapped by 2 (start) and 3 (accept)
        let nfa = Nfa::from_regex("a*").unwrap();
        assert_eq!(nfa.size(), 4);
        assert_eq!(nfa.start(), 2);
        assert_eq!(nfa.accept(), 3);

        assert_eq!(nfa.initial_closure(), set([0, 2, 3]));
        assert_eq!(nfa.epsilon_closure(&set([1])), set([0, 1, 3]));
        assert_eq!(nfa.epsilon_closure(&set([])), set([]));
    }

    #[test_log::test]
    fn move_does_not_follow_epsilon() {
        let nfa = Nfa::from_regex("ab").unwrap();
        let a = Symbol::Char('a');
        let b = Symbol::Char('b');

        assert_eq!(nfa.move_on(&nfa.initial_closure(), &a), set([1]));
        assert_eq!(nfa.move_on(&set([1]), &b), set([]));
        assert_eq!(nfa.move_on(&set([1, 2]), &b), set([3]));
    }

    #[test]
    fn alphabet_is_discovered() {
        let nfa = Nfa::from_regex("(x|[0-9])*zε").unwrap();
        let alphabet = nfa.alphabet();
        assert_eq!(
            alphabet.universe().cloned().collect::<Vec<_>>(),
            vec![
                Symbol::Char('x'),
                Symbol::Char('z'),
                Symbol::Class("[0-9]".into())
            ]
        );
    }

    #[test]
    fn transition_table_marks_start_and_accept() {
        let table = Nfa::from_regex("a").unwrap().show();
        assert!(table.contains("→q0"));
        assert!(table.contains("q1*"));
    }
}
