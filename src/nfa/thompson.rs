use tracing::trace;

use crate::{
    alphabet::Symbol,
    error::{Error, Result},
    regex::{Postfix, Token},
    StateId,
};

use super::{Nfa, NfaState};

/// An NFA under construction, given by its start and its single accept state. The
/// states themselves live in the arena of the [`ThompsonBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// Entry point of the fragment.
    pub start: StateId,
    /// The only accepting state of the fragment.
    pub accept: StateId,
}

/// Evaluates a postfix sequence token by token. Operands push fresh two-state fragments,
/// operators pop their operands and push the combined fragment. No state is ever
/// duplicated, operators only add states and epsilon transitions.
#[derive(Debug, Clone, Default)]
pub struct ThompsonBuilder {
    states: Vec<NfaState>,
    stack: Vec<Fragment>,
}

impl ThompsonBuilder {
    /// Creates a builder with an empty arena and an empty operand stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current depth of the operand stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn add_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn add_transition(&mut self, source: StateId, symbol: Symbol, target: StateId) {
        self.states[source].add_transition(symbol, target);
    }

    fn add_epsilon(&mut self, source: StateId, target: StateId) {
        self.add_transition(source, Symbol::Epsilon, target);
    }

    /// Pops the topmost `N` fragments, the deepest one comes first in the returned array.
    fn pop_operands<const N: usize>(&mut self, operator: char) -> Result<[Fragment; N]> {
        if self.stack.len() < N {
            return Err(Error::InsufficientOperands { operator });
        }
        let operands = self.stack.split_off(self.stack.len() - N);
        <[Fragment; N]>::try_from(operands).map_err(|_| Error::InsufficientOperands { operator })
    }

    fn fresh_pair(&mut self) -> (StateId, StateId) {
        (self.add_state(), self.add_state())
    }

    fn symbol(&mut self, symbol: Symbol) -> Fragment {
        let (start, accept) = self.fresh_pair();
        self.add_transition(start, symbol, accept);
        Fragment { start, accept }
    }

    fn concatenate(&mut self, left: Fragment, right: Fragment) -> Fragment {
        self.add_epsilon(left.accept, right.start);
        Fragment {
            start: left.start,
            accept: right.accept,
        }
    }

    fn union(&mut self, left: Fragment, right: Fragment) -> Fragment {
        let (start, accept) = self.fresh_pair();
        self.add_epsilon(start, left.start);
        self.add_epsilon(start, right.start);
        self.add_epsilon(left.accept, accept);
        self.add_epsilon(right.accept, accept);
        Fragment { start, accept }
    }

    fn kleene_star(&mut self, inner: Fragment) -> Fragment {
        let (start, accept) = self.fresh_pair();
        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, accept);
        self.add_epsilon(inner.accept, inner.start);
        self.add_epsilon(inner.accept, accept);
        Fragment { start, accept }
    }

    fn plus(&mut self, inner: Fragment) -> Fragment {
        let (start, accept) = self.fresh_pair();
        self.add_epsilon(start, inner.start);
        self.add_epsilon(inner.accept, inner.start);
        self.add_epsilon(inner.accept, accept);
        Fragment { start, accept }
    }

    fn optional(&mut self, inner: Fragment) -> Fragment {
        let (start, accept) = self.fresh_pair();
        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, accept);
        self.add_epsilon(inner.accept, accept);
        Fragment { start, accept }
    }

    /// Processes a single token. Fails with [`Error::InsufficientOperands`] if an operator
    /// finds too few fragments on the stack.
    pub fn push_token(&mut self, token: &Token) -> Result<()> {
        let fragment = match token {
            Token::Literal(c) => self.symbol(Symbol::Char(*c)),
            Token::Epsilon => self.symbol(Symbol::Epsilon),
            Token::Class(class) => self.symbol(Symbol::Class(class.clone())),
            Token::Concat => {
                let [left, right] = self.pop_operands::<2>('.')?;
                self.concatenate(left, right)
            }
            Token::Union => {
                let [left, right] = self.pop_operands::<2>('|')?;
                self.union(left, right)
            }
            Token::Star => {
                let [inner] = self.pop_operands::<1>('*')?;
                self.kleene_star(inner)
            }
            Token::Plus => {
                let [inner] = self.pop_operands::<1>('+')?;
                self.plus(inner)
            }
            Token::Optional => {
                let [inner] = self.pop_operands::<1>('?')?;
                self.optional(inner)
            }
        };
        trace!(
            "token {token} produced fragment {} -> {}",
            fragment.start,
            fragment.accept
        );
        self.stack.push(fragment);
        Ok(())
    }

    /// Turns the single fragment left on the stack into an [`Nfa`]. Fails with
    /// [`Error::MalformedPostfix`] if there is not exactly one.
    pub fn finish(self) -> Result<Nfa> {
        if self.stack.len() != 1 {
            return Err(Error::MalformedPostfix {
                residual: self.stack.len(),
            });
        }
        let Fragment { start, accept } = self.stack[0];
        Ok(Nfa::from_parts(self.states, start, accept))
    }
}

/// Builds an [`Nfa`] from `postfix` through Thompson's construction.
pub fn build(postfix: &Postfix) -> Result<Nfa> {
    let mut builder = ThompsonBuilder::new();
    for token in postfix {
        builder.push_token(token)?;
    }
    builder.finish()
}
