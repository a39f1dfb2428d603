//! Library for compiling regular expressions into finite automata in Rust.
//!
//! A pattern travels through a fixed pipeline. First the [`regex`] module turns the source text into a [`regex::Postfix`] token sequence, making concatenation explicit and resolving operator precedence. The Thompson construction in [`nfa::thompson`] evaluates that sequence against a stack of fragments and yields an [`Nfa`], whose states live in a single arena and are referenced by integer indices only, so the back edges introduced by `*` and `+` never form ownership cycles. The subset construction in [`dfa::subset`] determinizes the [`Nfa`] into a [`Dfa`] over the alphabet that is actually reachable, and [`dfa::minimize`] collapses indistinguishable states by filling a table of distinguishable pairs.
//!
//! Every stage produces a fresh structure and leaves its input untouched. All three automata implement [`Acceptor`], so a word can be checked against the NFA, the DFA or the minimized DFA alike, and they implement [`dot::Dottable`], which enumerates nodes and edges and derives a graphviz description from them.
//!
//! The [`pipeline`] module wires everything together for a batch of patterns, where a malformed pattern is reported and skipped instead of aborting the run.
//!
//! ```
//! use thompson::prelude::*;
//!
//! let nfa = Nfa::from_regex("(a|b)+").unwrap();
//! let dfa = nfa.determinize();
//! let minimal = dfa.minimize();
//!
//! for word in ["a", "ab", "bba"] {
//!     assert!(nfa.accepts(word) && dfa.accepts(word) && minimal.accepts(word));
//! }
//! assert!(!minimal.accepts(""));
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use thompson::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, Symbol},
        dfa::{Dfa, DfaBuilder},
        dot::{Dottable, GraphEdge, GraphNode},
        error::{Error, Result},
        math,
        nfa::{thompson::Fragment, Nfa, StateSet},
        pipeline::{compile, run_batch, Compiled, PatternReport, Verdicts},
        regex::{to_postfix, Postfix, Token},
        simulate::Acceptor,
        Show, StateId,
    };
}

/// Contains type aliases and small mathematical structures used throughout the crate.
pub mod math;

/// Module that contains definitions for dealing with symbols and alphabets.
pub mod alphabet;
pub use alphabet::{Alphabet, Symbol};

/// The errors that compiling a single pattern can produce.
pub mod error;
pub use error::{Error, Result};

/// Conversion of regular expressions into postfix token sequences.
pub mod regex;

/// Nondeterministic automata with epsilon transitions and their Thompson construction.
pub mod nfa;
pub use nfa::Nfa;

/// Deterministic automata, the subset construction and minimization.
pub mod dfa;
pub use dfa::Dfa;

/// Running words through automata.
pub mod simulate;
pub use simulate::Acceptor;

/// Enumeration of automata as graphs and their DOT representation.
pub mod dot;

/// Batch compilation of pattern lists.
pub mod pipeline;

/// States of every automaton in this crate are identified by an index into the arena of
/// the structure that owns them.
pub type StateId = usize;

/// Helper trait which can be used to display states, symbols and automata.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should be
    /// for example q0, q1, q2, ... and for an automaton its transition table.
    /// This is mainly used for debugging and for the command line output.
    fn show(&self) -> String;
}

impl Show for usize {
    fn show(&self) -> String {
        format!("q{self}")
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl Show for bit_set::BitSet {
    fn show(&self) -> String {
        format!(
            "{{{}}}",
            itertools::Itertools::join(&mut self.iter().map(|q| q.show()), ", ")
        )
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        format!(
            "\"{}\"",
            itertools::Itertools::join(&mut self.iter().map(|x| x.show()), "")
        )
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}
