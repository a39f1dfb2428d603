use std::{
    collections::{BTreeMap, BTreeSet},
    hash::Hash,
};

/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Sets whose iteration order is observable, for example in transition tables or DOT output.
pub type OrderedSet<S> = BTreeSet<S>;
/// Maps whose iteration order is observable.
pub type OrderedMap<K, V> = BTreeMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// A partition is a different view on an equivalence relation, by grouping elements of
/// type `I` into their respective classes under the relation.
#[derive(Debug, Clone)]
pub struct Partition<I: Hash + Eq>(Vec<BTreeSet<I>>);

impl<I: Hash + Eq> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Hash + Eq> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Hash + Eq> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Hash + Eq> Eq for Partition<I> {}

impl<I: Hash + Eq + Ord + Copy> Partition<I> {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a new partition from an iterator that yields iterators
    /// which yield elements of type `I`.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<BTreeSet<_>>())
                .collect(),
        )
    }

    /// Returns the canonical representative of every class, which is its least element.
    /// Empty classes have no representative and are skipped.
    pub fn representatives(&self) -> impl Iterator<Item = I> + '_ {
        self.0.iter().filter_map(|class| class.first().copied())
    }

    /// Maps every element of every class to the representative of its class.
    pub fn merge_map(&self) -> Map<I, I> {
        self.0
            .iter()
            .filter_map(|class| class.first().map(|rep| (class, *rep)))
            .flat_map(|(class, rep)| class.iter().map(move |q| (*q, rep)))
            .collect()
    }
}
