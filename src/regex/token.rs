use std::fmt::Display;

/// A single entry of a postfix sequence. Operands push a fragment onto the stack of the
/// Thompson construction, operators combine the fragments on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// A literal character.
    Literal(char),
    /// The empty word.
    Epsilon,
    /// An opaque character class like `[a-z]`, brackets included.
    Class(String),
    /// Binary concatenation, written `.` in postfix text.
    Concat,
    /// Binary alternation `|`.
    Union,
    /// Kleene star `*`.
    Star,
    /// One or more repetitions `+`.
    Plus,
    /// Zero or one occurrence `?`.
    Optional,
}

impl Token {
    /// The character an operator is written as, `None` for operands.
    pub fn operator(&self) -> Option<char> {
        match self {
            Token::Concat => Some('.'),
            Token::Union => Some('|'),
            Token::Star => Some('*'),
            Token::Plus => Some('+'),
            Token::Optional => Some('?'),
            _ => None,
        }
    }

    /// Binding strength used when resolving infix notation. Postfix unary operators bind
    /// strongest, then concatenation, then alternation. Operands have no precedence.
    pub fn precedence(&self) -> u8 {
        match self {
            Token::Star | Token::Plus | Token::Optional => 3,
            Token::Concat => 2,
            Token::Union => 1,
            _ => 0,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Literal(c) => write!(f, "{c}"),
            Token::Epsilon => write!(f, "ε"),
            Token::Class(class) => write!(f, "{class}"),
            op => write!(f, "{}", op.operator().unwrap_or_default()),
        }
    }
}
