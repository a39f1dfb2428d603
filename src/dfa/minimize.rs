use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    math::{Map, OrderedSet, Partition},
    Show, StateId,
};

use super::Dfa;

/// Symmetric relation on the states of a [`Dfa`] recording which pairs are known to be
/// distinguishable. Pairs are stored in a triangular bit matrix over the positions of the
/// states in ascending order, so the ids themselves need not be contiguous.
#[derive(Debug, Clone)]
pub struct DistinguishabilityTable {
    states: Vec<StateId>,
    positions: Map<StateId, usize>,
    marked: BitSet,
}

impl DistinguishabilityTable {
    fn slot(i: usize, j: usize) -> usize {
        let (low, high) = if i < j { (i, j) } else { (j, i) };
        high * (high - 1) / 2 + low
    }

    /// Builds the table in which precisely the pairs of one accepting and one rejecting
    /// state are marked.
    pub fn new(dfa: &Dfa) -> Self {
        let states = dfa.state_indices().collect_vec();
        let positions = states.iter().enumerate().map(|(i, q)| (*q, i)).collect();
        let n = states.len();
        let mut marked = BitSet::with_capacity(n * n.saturating_sub(1) / 2);

        for (i, j) in (0..n).tuple_combinations() {
            if dfa.is_accepting(states[i]) != dfa.is_accepting(states[j]) {
                marked.insert(Self::slot(i, j));
            }
        }
        Self {
            states,
            positions,
            marked,
        }
    }

    /// Returns true if the pair `(p, q)` has been marked as distinguishable. A state is
    /// never distinguishable from itself, neither are states the table does not know.
    pub fn distinguishable(&self, p: StateId, q: StateId) -> bool {
        match (self.positions.get(&p), self.positions.get(&q)) {
            (Some(&i), Some(&j)) if i != j => self.marked.contains(Self::slot(i, j)),
            _ => false,
        }
    }

    /// Decides whether the unmarked pair `(p, q)` has to be marked given the current marks.
    /// This is the case if for some symbol leaving either state the successors form a
    /// marked pair, or if only one of the two has a successor at all.
    fn splits(&self, dfa: &Dfa, p: StateId, q: StateId) -> bool {
        let symbols: OrderedSet<_> = dfa
            .edges_from(p)
            .chain(dfa.edges_from(q))
            .map(|(symbol, _)| symbol)
            .collect();

        symbols.into_iter().any(|symbol| {
            match (dfa.transition(p, symbol), dfa.transition(q, symbol)) {
                (Some(s), Some(t)) => s != t && self.distinguishable(s, t),
                (None, None) => false,
                _ => true,
            }
        })
    }

    /// Fills the table by propagating marks backwards until a full pass over all pairs
    /// yields no new mark. Returns the number of passes.
    fn fill(&mut self, dfa: &Dfa) -> usize {
        let n = self.states.len();
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for (i, j) in (0..n).tuple_combinations() {
                let slot = Self::slot(i, j);
                if self.marked.contains(slot) {
                    continue;
                }
                let (p, q) = (self.states[i], self.states[j]);
                if self.splits(dfa, p, q) {
                    trace!("{} and {} are distinguishable", p.show(), q.show());
                    self.marked.insert(slot);
                    changed = true;
                }
            }
            if !changed {
                return passes;
            }
        }
    }

    /// Groups the states into classes of pairwise indistinguishable states. The classes
    /// are listed in the order of their least element.
    pub fn classes(&self) -> Partition<StateId> {
        let n = self.states.len();
        let mut assigned = BitSet::with_capacity(n);
        let mut classes = vec![];

        for i in 0..n {
            if assigned.contains(i) {
                continue;
            }
            let class = (i..n)
                .filter(|&j| {
                    j == i || (!assigned.contains(j) && !self.marked.contains(Self::slot(i, j)))
                })
                .collect_vec();
            for &j in &class {
                assigned.insert(j);
            }
            classes.push(class.into_iter().map(|j| self.states[j]));
        }
        Partition::new(classes)
    }
}

/// Computes the table of distinguishable pairs of `dfa` up to the fixpoint.
pub fn distinguishable_pairs(dfa: &Dfa) -> DistinguishabilityTable {
    let mut table = DistinguishabilityTable::new(dfa);
    let passes = table.fill(dfa);
    debug!(
        "distinguishability table of {} states stabilized after {passes} passes",
        dfa.size()
    );
    table
}

/// Partitions the states of `dfa` into classes of language equivalent states.
pub fn equivalence_classes(dfa: &Dfa) -> Partition<StateId> {
    distinguishable_pairs(dfa).classes()
}

impl Dfa {
    /// Computes an equivalent DFA in which no two states are indistinguishable. Every class
    /// of equivalent states collapses into its least member, which keeps its id, and all
    /// transitions are redirected to the representatives. The runtime is quadratic in the
    /// number of states per pass, which is fine for automata of moderate size.
    ///
    /// ```
    /// use thompson::prelude::*;
    ///
    /// let dfa = Nfa::from_regex("(a|b)*").unwrap().determinize();
    /// assert_eq!(dfa.size(), 3);
    /// assert_eq!(dfa.minimize().size(), 1);
    /// ```
    pub fn minimize(&self) -> Dfa {
        let partition = equivalence_classes(self);
        let merge = partition.merge_map();
        let representative = |q: StateId| merge.get(&q).copied().unwrap_or(q);

        let mut minimized = Dfa::new(representative(self.initial()));
        for rep in partition.representatives() {
            minimized.add_state(rep, false);
            for (symbol, target) in self.edges_from(rep) {
                minimized.add_transition(rep, symbol.clone(), representative(target));
            }
        }
        for &q in self.accepting_states() {
            minimized.add_state(representative(q), true);
        }

        debug!(
            "minimization merged {} states into {} classes",
            self.size(),
            minimized.size()
        );
        minimized
    }
}
