use itertools::Itertools;

use crate::{
    alphabet::{Alphabet, Symbol},
    math::{OrderedMap, OrderedSet},
    Show, StateId,
};

/// Determinization of NFAs through the subset construction.
pub mod subset;

/// Minimization of DFAs by filling a table of distinguishable state pairs.
pub mod minimize;

/// A deterministic finite automaton. Every state has at most one successor per symbol and
/// there are no epsilon transitions. A missing transition means the word is rejected, there
/// is no explicit sink state.
///
/// DFAs produced by [`subset::subset_construction`] number their states in discovery order
/// starting from the initial state `0`. A minimized DFA keeps the ids of the class
/// representatives, so its ids need not be contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    initial: StateId,
    states: OrderedSet<StateId>,
    transitions: OrderedMap<StateId, OrderedMap<Symbol, StateId>>,
    accepting: OrderedSet<StateId>,
}

impl Dfa {
    /// Creates a DFA consisting of nothing but the non-accepting state `initial`.
    pub fn new(initial: StateId) -> Self {
        Self {
            initial,
            states: OrderedSet::from([initial]),
            transitions: OrderedMap::new(),
            accepting: OrderedSet::new(),
        }
    }

    /// Returns a [`DfaBuilder`], which is mostly handy for writing down small automata.
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// Adds `state`, if it is not present yet. If `accepting` is true, the state is
    /// marked as accepting, a state that is already accepting stays so.
    pub fn add_state(&mut self, state: StateId, accepting: bool) {
        self.states.insert(state);
        if accepting {
            self.accepting.insert(state);
        }
    }

    /// Sets the transition from `source` on `symbol` to `target`, replacing an existing one.
    /// Both states are added if necessary. Epsilon transitions are refused.
    pub fn add_transition(&mut self, source: StateId, symbol: Symbol, target: StateId) {
        if symbol.is_epsilon() {
            tracing::error!("cannot add epsilon transition {source} -> {target} to a DFA");
            return;
        }
        self.states.insert(source);
        self.states.insert(target);
        self.transitions
            .entry(source)
            .or_default()
            .insert(symbol, target);
    }

    /// The initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Iterates over all state ids in ascending order.
    pub fn state_indices(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().copied()
    }

    /// Returns true if `state` is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    /// Returns the accepting states.
    pub fn accepting_states(&self) -> &OrderedSet<StateId> {
        &self.accepting
    }

    /// Returns the successor of `state` on `symbol`, or `None` if there is no such transition.
    pub fn transition(&self, state: StateId, symbol: &Symbol) -> Option<StateId> {
        self.transitions
            .get(&state)
            .and_then(|edges| edges.get(symbol))
            .copied()
    }

    /// Iterates over the transitions leaving `state` as `(symbol, target)` pairs.
    pub fn edges_from(&self, state: StateId) -> impl Iterator<Item = (&Symbol, StateId)> + '_ {
        self.transitions
            .get(&state)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(symbol, target)| (symbol, *target)))
    }

    /// The total number of transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(|edges| edges.len()).sum()
    }

    /// All symbols that label some transition.
    pub fn alphabet(&self) -> Alphabet {
        self.transitions
            .values()
            .flat_map(|edges| edges.keys().cloned())
            .collect()
    }

    /// Returns a string representation of the transition table.
    fn build_transition_table(&self) -> String {
        let alphabet = self.alphabet();
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(alphabet.universe().map(|s| s.show())),
        );
        for q in self.state_indices() {
            let marker = if q == self.initial { "→" } else { "" };
            let color = if self.is_accepting(q) { "*" } else { "" };
            let mut row = vec![format!("{marker}{}{color}", q.show())];
            for symbol in alphabet.universe() {
                row.push(
                    self.transition(q, symbol)
                        .map_or("-".to_string(), |p| p.show()),
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

impl Show for Dfa {
    fn show(&self) -> String {
        self.build_transition_table()
    }
}

/// Collects states and transitions and turns them into a [`Dfa`] in one go.
///
/// ```
/// use thompson::prelude::*;
///
/// let dfa = Dfa::builder()
///     .with_accepting([1])
///     .with_edges([(0, 'a', 1), (1, 'a', 1)])
///     .into_dfa(0);
/// assert_eq!(dfa.size(), 2);
/// assert!(dfa.accepts("aaa"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DfaBuilder {
    states: Vec<StateId>,
    accepting: Vec<StateId>,
    edges: Vec<(StateId, Symbol, StateId)>,
}

impl DfaBuilder {
    /// Adds the given states, which is only needed for states without any transitions.
    pub fn with_states<I: IntoIterator<Item = StateId>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    /// Marks the given states as accepting.
    pub fn with_accepting<I: IntoIterator<Item = StateId>>(mut self, states: I) -> Self {
        self.accepting.extend(states);
        self
    }

    /// Adds transitions given as `(source, symbol, target)` triples.
    pub fn with_edges<S, I>(mut self, edges: I) -> Self
    where
        S: Into<Symbol>,
        I: IntoIterator<Item = (StateId, S, StateId)>,
    {
        self.edges.extend(
            edges
                .into_iter()
                .map(|(source, symbol, target)| (source, symbol.into(), target)),
        );
        self
    }

    /// Builds the DFA with initial state `initial`.
    pub fn into_dfa(self, initial: StateId) -> Dfa {
        let mut dfa = Dfa::new(initial);
        for state in self.states {
            dfa.add_state(state, false);
        }
        for state in self.accepting {
            dfa.add_state(state, true);
        }
        for (source, symbol, target) in self.edges {
            dfa.add_transition(source, symbol, target);
        }
        dfa
    }
}

impl std::fmt::Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DFA with initial state {} and {} states, accepting {{{}}}",
            self.initial.show(),
            self.size(),
            self.accepting.iter().map(|q| q.show()).join(", ")
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::prelude::*;

    /// The six state example from the wikipedia article on DFA minimization.
    pub fn wiki_dfa() -> Dfa {
        Dfa::builder()
            .with_accepting([2, 3, 4])
            .with_edges([
                (0, 'a', 1),
                (0, 'b', 2),
                (1, 'a', 0),
                (1, 'b', 3),
                (2, 'a', 4),
                (2, 'b', 5),
                (3, 'a', 4),
                (3, 'b', 5),
                (4, 'a', 4),
                (4, 'b', 5),
                (5, 'a', 5),
                (5, 'b', 5),
            ])
            .into_dfa(0)
    }

    #[test]
    fn dfa_basic() {
        let dfa = wiki_dfa();
        assert_eq!(dfa.size(), 6);
        assert_eq!(dfa.initial(), 0);
        assert_eq!(dfa.transition_count(), 12);
        assert_eq!(dfa.transition(1, &Symbol::Char('b')), Some(3));
        assert_eq!(dfa.transition(1, &Symbol::Char('c')), None);
        assert_eq!(dfa.alphabet().size(), 2);
        assert!(dfa.is_accepting(3));
        assert!(!dfa.is_accepting(5));
    }

    #[test_log::test]
    fn epsilon_transitions_are_refused() {
        let mut dfa = Dfa::new(0);
        dfa.add_transition(0, Symbol::Epsilon, 1);
        assert_eq!(dfa.size(), 1);
        assert_eq!(dfa.transition_count(), 0);
    }

    #[test]
    fn states_without_edges() {
        let dfa = Dfa::builder().with_states([3]).with_accepting([7]).into_dfa(0);
        assert_eq!(dfa.state_indices().collect::<Vec<_>>(), vec![0, 3, 7]);
        assert_eq!(dfa.edges_from(3).count(), 0);
    }

    #[test]
    fn display_and_table() {
        let dfa = wiki_dfa();
        assert_eq!(
            dfa.to_string(),
            "DFA with initial state q0 and 6 states, accepting {q2, q3, q4}"
        );
        let table = dfa.show();
        assert!(table.contains("→q0"));
        assert!(table.contains("q4*"));
    }
}
