use std::fmt::{Debug, Display};

use itertools::Itertools;

use crate::{math::OrderedSet, Show};

/// A symbol labels a single transition. Apart from plain characters there is the
/// non-consuming epsilon marker and the opaque character class, which keeps the
/// bracketed text of the pattern (e.g. `[a-z]`) as one indivisible label.
///
/// Classes are not expanded into the characters they denote, so a class transition is only
/// taken when the input itself contains the same [`Symbol::Class`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// The empty word, a transition on it does not consume input.
    Epsilon,
    /// A single input character.
    Char(char),
    /// A bracket delimited character class, stored verbatim including the brackets.
    Class(String),
}

impl Symbol {
    /// Returns true if and only if `self` is [`Symbol::Epsilon`].
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Symbol::Char(value)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Char(c) => write!(f, "{c}"),
            Symbol::Class(class) => write!(f, "{class}"),
        }
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl Show for Symbol {
    fn show(&self) -> String {
        self.to_string()
    }
}

/// The alphabet of an automaton is the ordered set of non-epsilon symbols that label
/// its transitions. It is always discovered from the automaton itself.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Alphabet(OrderedSet<Symbol>);

impl Alphabet {
    /// Creates an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `symbol` to the alphabet. Epsilon is never part of an alphabet, so inserting it
    /// has no effect. Returns true if the symbol was not present before.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if symbol.is_epsilon() {
            return false;
        }
        self.0.insert(symbol)
    }

    /// Checks whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains(symbol)
    }

    /// Iterates over the symbols in their natural order.
    pub fn universe(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.0.iter()
    }

    /// The number of symbols.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        let mut alphabet = Alphabet::new();
        for symbol in iter {
            alphabet.insert(symbol);
        }
        alphabet
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_is_not_part_of_alphabets() {
        let alphabet: Alphabet = [
            Symbol::Char('b'),
            Symbol::Epsilon,
            Symbol::Class("[0-9]".into()),
            Symbol::Char('a'),
            Symbol::Char('b'),
        ]
        .into_iter()
        .collect();

        assert_eq!(alphabet.size(), 3);
        assert!(!alphabet.contains(&Symbol::Epsilon));
        assert_eq!(format!("{alphabet:?}"), "{a, b, [0-9]}");
    }
}
