//! Error types for the filter lexer, parser and compiler.

use thiserror::Error;

/// A specialized Result type for filter parsing and compilation.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors raised while turning WHERE-clause text into a filter tree.
///
/// Every variant is fatal to the call that produced it; no partial tree is
/// ever returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    /// The expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// A character that starts no token.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The character that could not be tokenized.
        character: char,
        /// Byte offset of the character.
        position: usize,
    },

    /// A quoted string without its closing quote.
    #[error("unterminated string at position {position}: {fragment}")]
    UnterminatedString {
        /// The text read before the end of input.
        fragment: String,
        /// Byte offset of the opening quote.
        position: usize,
    },

    /// A numeric literal that does not fit the literal types.
    #[error("invalid number '{fragment}' at position {position}")]
    InvalidNumber {
        /// The offending digits.
        fragment: String,
        /// Byte offset of the number.
        position: usize,
    },

    /// A token that is not allowed where it appears.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The offending token text.
        token: String,
        /// Byte offset of the token.
        position: usize,
    },

    /// The input ended in the middle of a construct.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// A `(` without its matching `)`.
    #[error("unclosed parenthesis at position {position}")]
    UnclosedParenthesis {
        /// Byte offset of the opening parenthesis.
        position: usize,
    },

    /// Open/close markers that do not pair up in the infix stream.
    #[error("unbalanced parentheses")]
    UnbalancedParenthesis,

    /// A boolean operator found fewer than two operands.
    #[error("operator {operator} is missing an operand")]
    OperandUnderflow {
        /// The operator that underflowed.
        operator: String,
    },

    /// Operands left over once every operator has been applied.
    #[error("{count} operands are not joined by an operator")]
    DanglingOperands {
        /// Number of operands left on the stack.
        count: usize,
    },
}

impl SyntaxError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        SyntaxError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Creates an operand underflow error.
    pub fn operand_underflow(operator: impl Into<String>) -> Self {
        SyntaxError::OperandUnderflow {
            operator: operator.into(),
        }
    }

    /// Returns the offending source fragment, when the error has one.
    pub fn fragment(&self) -> Option<String> {
        match self {
            SyntaxError::UnexpectedCharacter { character, .. } => Some(character.to_string()),
            SyntaxError::UnterminatedString { fragment, .. }
            | SyntaxError::InvalidNumber { fragment, .. } => Some(fragment.clone()),
            SyntaxError::UnexpectedToken { token, .. } => Some(token.clone()),
            SyntaxError::OperandUnderflow { operator } => Some(operator.clone()),
            _ => None,
        }
    }

    /// Returns the byte offset of the error in the source text, when known.
    pub fn position(&self) -> Option<usize> {
        match self {
            SyntaxError::UnexpectedCharacter { position, .. }
            | SyntaxError::UnterminatedString { position, .. }
            | SyntaxError::InvalidNumber { position, .. }
            | SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::UnclosedParenthesis { position } => Some(*position),
            _ => None,
        }
    }
}
