use std::borrow::Borrow;

use tracing::trace;

use crate::{alphabet::Symbol, dfa::Dfa, nfa::Nfa, Show};

/// Implemented by automata that can decide whether they accept a finite word.
pub trait Acceptor {
    /// Runs `word` through the automaton and returns true if and only if it ends up
    /// accepting. The symbols can be given by value or by reference.
    fn accepts_word<W, S>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = S>,
        S: Borrow<Symbol>;

    /// Reads `input` character by character, each one becoming a [`Symbol::Char`].
    /// The empty string is accepted precisely if the automaton accepts the empty word.
    fn accepts(&self, input: &str) -> bool {
        self.accepts_word(input.chars().map(Symbol::Char))
    }
}

impl Acceptor for Nfa {
    fn accepts_word<W, S>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = S>,
        S: Borrow<Symbol>,
    {
        let mut current = self.initial_closure();
        trace!("starting NFA run in {}", current.show());

        for symbol in word {
            let symbol = symbol.borrow();
            current = self.epsilon_closure(&self.move_on(&current, symbol));
            trace!("read {symbol}, now in {}", current.show());
            if current.is_empty() {
                return false;
            }
        }
        current.contains(self.accept())
    }
}

impl Acceptor for Dfa {
    fn accepts_word<W, S>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = S>,
        S: Borrow<Symbol>,
    {
        let mut state = self.initial();
        for symbol in word {
            let symbol = symbol.borrow();
            match self.transition(state, symbol) {
                Some(next) => {
                    trace!("{} --{symbol}--> {}", state.show(), next.show());
                    state = next;
                }
                None => {
                    trace!("{} has no transition on {symbol}", state.show());
                    return false;
                }
            }
        }
        self.is_accepting(state)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    fn all_three(pattern: &str) -> (Nfa, Dfa, Dfa) {
        let nfa = Nfa::from_regex(pattern).unwrap();
        let dfa = nfa.determinize();
        let minimal = dfa.minimize();
        (nfa, dfa, minimal)
    }

    fn check(pattern: &str, accepted: &[&str], rejected: &[&str]) {
        let (nfa, dfa, minimal) = all_three(pattern);
        for word in accepted {
            assert!(nfa.accepts(word), "NFA of {pattern} rejects {word:?}");
            assert!(dfa.accepts(word), "DFA of {pattern} rejects {word:?}");
            assert!(minimal.accepts(word), "minimal DFA of {pattern} rejects {word:?}");
        }
        for word in rejected {
            assert!(!nfa.accepts(word), "NFA of {pattern} accepts {word:?}");
            assert!(!dfa.accepts(word), "DFA of {pattern} accepts {word:?}");
            assert!(!minimal.accepts(word), "minimal DFA of {pattern} accepts {word:?}");
        }
    }

    #[test_log::test]
    fn union() {
        check("a|b", &["a", "b"], &["ab", "", "c"]);
    }

    #[test_log::test]
    fn star_binds_tighter_than_concatenation() {
        check("ab*", &["a", "ab", "abbb"], &["b", "ba", ""]);
    }

    #[test_log::test]
    fn plus_of_union() {
        check("(a|b)+", &["a", "ab", "bba"], &[""]);
    }

    #[test_log::test]
    fn optional_prefix() {
        check("a?b", &["b", "ab"], &["aab", "a", ""]);
    }

    #[test_log::test]
    fn epsilon_operand() {
        check("aε|b", &["a", "b"], &["", "ε"]);
        check("(a|ε)*", &["", "a", "aaa"], &["b"]);
    }

    #[test]
    fn class_symbols_are_opaque() {
        let (nfa, dfa, minimal) = all_three("x[0-9]");
        let word = [Symbol::Char('x'), Symbol::Class("[0-9]".into())];
        assert!(nfa.accepts_word(&word));
        assert!(dfa.accepts_word(&word));
        assert!(minimal.accepts_word(word.iter()));
        assert!(!dfa.accepts("x5"));
    }

    #[test_log::test]
    fn stages_agree_on_short_words() {
        let letters = [Symbol::Char('a'), Symbol::Char('b'), Symbol::Char('c')];
        for pattern in [
            "(a|b)*abb",
            "a(b|c)*a?",
            "(ab|ba)+c",
            "((a|ε)b)*",
            "a*b*c*",
            "(a|b)(a|b)?c+",
        ] {
            let (nfa, dfa, minimal) = all_three(pattern);
            assert_eq!(dfa.accepts(""), nfa.accepts(""), "{pattern}");
            assert_eq!(minimal.accepts(""), nfa.accepts(""), "{pattern}");
            for length in 1..=5 {
                for word in (0..length)
                    .map(|_| letters.iter())
                    .multi_cartesian_product()
                {
                    let expected = nfa.accepts_word(word.iter().copied());
                    assert_eq!(
                        dfa.accepts_word(word.iter().copied()),
                        expected,
                        "{pattern} on {}",
                        word.show()
                    );
                    assert_eq!(
                        minimal.accepts_word(word.iter().copied()),
                        expected,
                        "{pattern} on {}",
                        word.show()
                    );
                }
            }
        }
    }

    #[test]
    fn shared_between_threads() {
        let (nfa, dfa, minimal) = all_three("(a|b)*b");
        std::thread::scope(|scope| {
            for word in ["ab", "ba", "bbb", ""] {
                let (nfa, dfa, minimal) = (&nfa, &dfa, &minimal);
                scope.spawn(move || {
                    let expected = word.ends_with('b');
                    assert_eq!(nfa.accepts(word), expected);
                    assert_eq!(dfa.accepts(word), expected);
                    assert_eq!(minimal.accepts(word), expected);
                });
            }
        });
    }
}
