use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use tracing::trace;

use crate::error::{Error, Result};

mod token;
pub use token::Token;

/// A regular expression in reverse polish notation. Concatenation is explicit and
/// parentheses are gone, so the sequence can be evaluated left to right with a stack.
///
/// The textual form writes operands as they appear in the pattern, epsilon as `ε` and
/// concatenation as `.`; it can be parsed back through [`FromStr`].
///
/// ```
/// use thompson::prelude::*;
///
/// let postfix = to_postfix("(a|b)*c").unwrap();
/// assert_eq!(postfix.to_string(), "ab|*c.");
/// assert_eq!("ab|*c.".parse::<Postfix>().unwrap(), postfix);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Postfix(Vec<Token>);

impl Postfix {
    /// Returns the tokens in evaluation order.
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tokens, which is the case for an empty pattern.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Token>> for Postfix {
    fn from(value: Vec<Token>) -> Self {
        Self(value)
    }
}

impl<'a> IntoIterator for &'a Postfix {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Postfix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(""))
    }
}

impl FromStr for Postfix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = vec![];
        let mut rest = s;
        while let Some(c) = rest.chars().next() {
            let (token, len) = match c {
                '.' => (Token::Concat, 1),
                '|' => (Token::Union, 1),
                '*' => (Token::Star, 1),
                '+' => (Token::Plus, 1),
                '?' => (Token::Optional, 1),
                '[' => {
                    let class = scan_class(rest);
                    (Token::Class(class.to_string()), class.len())
                }
                'ε' => (Token::Epsilon, c.len_utf8()),
                c if c.is_alphanumeric() => (Token::Literal(c), c.len_utf8()),
                unknown => return Err(Error::UnknownOperator(unknown)),
            };
            tokens.push(token);
            rest = &rest[len..];
        }
        Ok(Self(tokens))
    }
}

/// Infix lexemes, parentheses are only needed until precedence is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    Operand(Token),
    Operator(Token),
    Open,
    Close,
}

/// Returns the class starting at the front of `rest`, running through the next `]`
/// or to the end of the input if there is none.
fn scan_class(rest: &str) -> &str {
    let len = rest.find(']').map_or(rest.len(), |end| end + 1);
    &rest[..len]
}

fn lex(pattern: &str) -> Result<Vec<Lexeme>> {
    let mut lexemes = Vec::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(c) = rest.chars().next() {
        let mut len = c.len_utf8();
        let lexeme = match c {
            '(' => Lexeme::Open,
            ')' => Lexeme::Close,
            '|' => Lexeme::Operator(Token::Union),
            '*' => Lexeme::Operator(Token::Star),
            '+' => Lexeme::Operator(Token::Plus),
            '?' => Lexeme::Operator(Token::Optional),
            '[' => {
                let class = scan_class(rest);
                len = class.len();
                Lexeme::Operand(Token::Class(class.to_string()))
            }
            'ε' => Lexeme::Operand(Token::Epsilon),
            c if c.is_alphanumeric() => Lexeme::Operand(Token::Literal(c)),
            unknown => return Err(Error::UnknownOperator(unknown)),
        };
        lexemes.push(lexeme);
        rest = &rest[len..];
    }
    Ok(lexemes)
}

/// Concatenation is implicit between two adjacent lexemes unless the left one opens a
/// group or an alternative, or the right one closes a group or is an operator.
fn needs_concatenation(left: &Lexeme, right: &Lexeme) -> bool {
    !matches!(left, Lexeme::Open | Lexeme::Operator(Token::Union))
        && !matches!(right, Lexeme::Close | Lexeme::Operator(_))
}

fn insert_concatenation(lexemes: Vec<Lexeme>) -> Vec<Lexeme> {
    let mut out = Vec::with_capacity(2 * lexemes.len());
    for lexeme in lexemes {
        if let Some(last) = out.last() {
            if needs_concatenation(last, &lexeme) {
                out.push(Lexeme::Operator(Token::Concat));
            }
        }
        out.push(lexeme);
    }
    out
}

/// Converts the infix `pattern` into a [`Postfix`] sequence with the shunting-yard
/// algorithm.
///
/// Fails with [`Error::MalformedExpression`] if the parentheses do not match up and with
/// [`Error::UnknownOperator`] on characters that are neither operands nor operators.
pub fn to_postfix(pattern: &str) -> Result<Postfix> {
    let lexemes = insert_concatenation(lex(pattern)?);

    let mut output = Vec::with_capacity(lexemes.len());
    let mut stack: Vec<Lexeme> = vec![];

    for lexeme in lexemes {
        match lexeme {
            Lexeme::Operand(token) => output.push(token),
            Lexeme::Open => stack.push(Lexeme::Open),
            Lexeme::Close => loop {
                match stack.pop() {
                    Some(Lexeme::Open) => break,
                    Some(Lexeme::Operator(op)) => output.push(op),
                    _ => return Err(Error::MalformedExpression),
                }
            },
            Lexeme::Operator(op) => {
                while let Some(Lexeme::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    if let Some(Lexeme::Operator(top)) = stack.pop() {
                        output.push(top);
                    }
                }
                stack.push(Lexeme::Operator(op));
            }
        }
    }

    while let Some(lexeme) = stack.pop() {
        match lexeme {
            Lexeme::Operator(op) => output.push(op),
            _ => return Err(Error::MalformedExpression),
        }
    }

    let postfix = Postfix(output);
    trace!("converted {pattern:?} into postfix {postfix}");
    Ok(postfix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(pattern: &str) -> String {
        to_postfix(pattern).unwrap().to_string()
    }

    #[test_log::test]
    fn implicit_concatenation_and_precedence() {
        assert_eq!(postfix("a|b"), "ab|");
        assert_eq!(postfix("ab*"), "ab*.");
        assert_eq!(postfix("(a|b)+"), "ab|+");
        assert_eq!(postfix("a?b"), "a?b.");
        assert_eq!(postfix("ab|c"), "ab.c|");
        assert_eq!(postfix("a|bc"), "abc.|");
        assert_eq!(postfix("(ab)*c"), "ab.*c.");
        assert_eq!(postfix("a**"), "a**");
        assert_eq!(postfix("(a)(b)"), "ab.");
        assert_eq!(postfix("aεb"), "aε.b.");
    }

    #[test_log::test]
    fn classes_are_single_operands() {
        let converted = to_postfix("[a-z]x|[0-9]").unwrap();
        assert_eq!(
            converted.tokens(),
            &[
                Token::Class("[a-z]".into()),
                Token::Literal('x'),
                Token::Concat,
                Token::Class("[0-9]".into()),
                Token::Union,
            ]
        );
        assert_eq!(converted.to_string(), "[a-z]x.[0-9]|");

        // an unterminated class swallows the remainder of the pattern
        assert_eq!(
            to_postfix("a[bc").unwrap().tokens(),
            &[Token::Literal('a'), Token::Class("[bc".into()), Token::Concat]
        );
    }

    #[test_log::test]
    fn unbalanced_parentheses() {
        assert_eq!(to_postfix(")("), Err(Error::MalformedExpression));
        assert_eq!(to_postfix("a)"), Err(Error::MalformedExpression));
        assert_eq!(to_postfix("(a"), Err(Error::MalformedExpression));
        assert_eq!(to_postfix("((a)"), Err(Error::MalformedExpression));
    }

    #[test_log::test]
    fn unknown_characters() {
        assert_eq!(to_postfix("a#b"), Err(Error::UnknownOperator('#')));
        assert_eq!(to_postfix("a.b"), Err(Error::UnknownOperator('.')));
        assert_eq!(to_postfix("a b"), Err(Error::UnknownOperator(' ')));
    }

    #[test]
    fn empty_pattern_gives_empty_postfix() {
        assert!(to_postfix("").unwrap().is_empty());
        assert!(to_postfix("()").unwrap().is_empty());
    }

    #[test]
    fn postfix_text_round_trip() {
        let parsed: Postfix = "ab|*[x-z]ε.?.".parse().unwrap();
        assert_eq!(parsed.len(), 9);
        assert_eq!(parsed.to_string(), "ab|*[x-z]ε.?.");
        assert_eq!("ab(".parse::<Postfix>(), Err(Error::UnknownOperator('(')));
    }
}
