use thiserror::Error;

/// Everything that can go wrong while compiling a single pattern. None of these
/// are fatal for a batch, the pattern is reported and the next one is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The parentheses of the pattern are unbalanced.
    #[error("malformed expression: unbalanced parentheses")]
    MalformedExpression,
    /// An operator was applied while the fragment stack held fewer operands than it needs.
    #[error("insufficient operands for `{operator}`")]
    InsufficientOperands {
        /// The offending operator.
        operator: char,
    },
    /// Evaluating the postfix sequence did not leave exactly one fragment behind.
    #[error("the postfix expression is malformed, {residual} fragments remain on the stack")]
    MalformedPostfix {
        /// Number of fragments left on the stack.
        residual: usize,
    },
    /// A character that is neither an operand nor a known operator.
    #[error("unknown operator `{0}`")]
    UnknownOperator(char),
}

/// Result type used by all fallible compilation steps.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn messages_name_the_culprit() {
        assert_eq!(
            Error::InsufficientOperands { operator: '|' }.to_string(),
            "insufficient operands for `|`"
        );
        assert_eq!(
            Error::MalformedPostfix { residual: 2 }.to_string(),
            "the postfix expression is malformed, 2 fragments remain on the stack"
        );
        assert_eq!(Error::UnknownOperator('#').to_string(), "unknown operator `#`");
    }
}
