use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{math::Bijection, nfa::Nfa, Show, StateId};

use super::Dfa;

impl Nfa {
    /// Determinizes `self` through the subset construction, see [`subset_construction`].
    pub fn determinize(&self) -> Dfa {
        subset_construction(self)
    }
}

/// Converts `nfa` into an equivalent [`Dfa`] whose states are the subsets of NFA states
/// that are reachable from the epsilon closure of the start state.
pub fn subset_construction(nfa: &Nfa) -> Dfa {
    subset_construction_with_subsets(nfa).0
}

/// Performs the subset construction and additionally returns the [`Bijection`] between
/// the ids of the DFA states and the subsets of NFA states they stand for. The subsets
/// are given as sorted vectors of NFA state ids.
///
/// The alphabet is the one returned by [`Nfa::alphabet`], so it contains exactly the
/// symbols that can actually be read. The initial subset receives id `0`, all others
/// are numbered in the order in which they are discovered. Empty subsets never become
/// states, instead the transition is left out.
pub fn subset_construction_with_subsets(nfa: &Nfa) -> (Dfa, Bijection<StateId, Vec<StateId>>) {
    let alphabet = nfa.alphabet();
    let mut discovered: Bijection<StateId, Vec<StateId>> = Bijection::new();
    let mut queue = VecDeque::new();

    let initial = nfa.initial_closure();
    let mut dfa = Dfa::new(0);
    dfa.add_state(0, initial.contains(nfa.accept()));
    discovered.insert(0, initial.iter().collect());
    queue.push_back((0, initial));

    while let Some((source, subset)) = queue.pop_front() {
        for symbol in alphabet.universe() {
            let reached = nfa.epsilon_closure(&nfa.move_on(&subset, symbol));
            if reached.is_empty() {
                continue;
            }

            let key = reached.iter().collect_vec();
            let target = match discovered.get_by_right(&key) {
                Some(&known) => known,
                None => {
                    let id = discovered.len();
                    trace!(
                        "discovered {} as {} via {} from {}",
                        reached.show(),
                        id.show(),
                        symbol,
                        source.show()
                    );
                    dfa.add_state(id, reached.contains(nfa.accept()));
                    discovered.insert(id, key);
                    queue.push_back((id, reached));
                    id
                }
            };
            dfa.add_transition(source, symbol.clone(), target);
        }
    }

    debug!(
        "subset construction turned {} NFA states into {} DFA states over {:?}",
        nfa.size(),
        dfa.size(),
        alphabet
    );
    (dfa, discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test_log::test]
    fn determinize_union() {
        let nfa = Nfa::from_regex("a|b").unwrap();
        let (dfa, subsets) = subset_construction_with_subsets(&nfa);

        assert_eq!(dfa.size(), 3);
        assert_eq!(dfa.initial(), 0);
        assert_eq!(subsets.get_by_left(&0), Some(&vec![0, 2, 4]));
        assert!(!dfa.is_accepting(0));

        let on_a = dfa.transition(0, &Symbol::Char('a')).unwrap();
        let on_b = dfa.transition(0, &Symbol::Char('b')).unwrap();
        assert_ne!(on_a, on_b);
        assert!(dfa.is_accepting(on_a) && dfa.is_accepting(on_b));
        assert_eq!(subsets.get_by_left(&on_a), Some(&vec![1, 5]));
        assert_eq!(dfa.edges_from(on_a).count(), 0);
    }

    #[test_log::test]
    fn discovered_subsets_are_distinct_and_non_empty() {
        for pattern in ["(a|b)*abb", "(ab|ba)+c?", "a*b*c*", "((a|b)(c|d))*"] {
            let nfa = Nfa::from_regex(pattern).unwrap();
            let (dfa, subsets) = subset_construction_with_subsets(&nfa);

            assert_eq!(subsets.len(), dfa.size(), "{pattern}");
            for (id, subset) in subsets.iter() {
                assert!(!subset.is_empty(), "{pattern}");
                assert!(subset.windows(2).all(|w| w[0] < w[1]), "{pattern}");
                assert_eq!(
                    dfa.is_accepting(*id),
                    subset.contains(&nfa.accept()),
                    "{pattern}"
                );
            }
            assert_eq!(
                dfa.state_indices().collect::<Vec<_>>(),
                (0..dfa.size()).collect::<Vec<_>>()
            );
        }
    }

    #[test_log::test]
    fn alphabet_is_not_fixed() {
        let dfa = Nfa::from_regex("XYZ|[0-9]ε|ü").unwrap().determinize();
        assert_eq!(
            dfa.alphabet().universe().cloned().collect::<Vec<_>>(),
            vec![
                Symbol::Char('X'),
                Symbol::Char('Y'),
                Symbol::Char('Z'),
                Symbol::Char('ü'),
                Symbol::Class("[0-9]".into())
            ]
        );
        assert!(dfa.accepts("XYZ"));
        assert!(dfa.accepts("ü"));
        assert!(dfa.accepts_word([Symbol::Class("[0-9]".into())]));
        assert!(!dfa.accepts("5"));
    }

    #[test]
    fn epsilon_only_pattern() {
        let dfa = Nfa::from_regex("ε").unwrap().determinize();
        assert_eq!(dfa.size(), 1);
        assert!(dfa.is_accepting(0));
        assert_eq!(dfa.transition_count(), 0);
    }
}
