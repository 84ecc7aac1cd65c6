//! Parse failures.
//!
//! Every builder in the parser returns a [`Status`]. A failure carries one of
//! five kinds plus the index of the token at which construction stopped.

use std::fmt;

use thiserror::Error;

/// Result of a parsing operation.
pub type Status<T = ()> = Result<T, ParseError>;

/// The category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation read from input has no entry in the grammar.
    UnknownOperation,
    /// The input disagrees with the grammar's declared arity or operand kind.
    GrammarMismatch,
    /// Expression nesting exceeded the supplied bound.
    RecursionLimitExceeded,
    /// A reference names an identifier that is not declared yet.
    UndeclaredIdentifier,
    /// The reader could not produce a token where one was required.
    MalformedInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownOperation => "unknown operation",
            ErrorKind::GrammarMismatch => "grammar mismatch",
            ErrorKind::RecursionLimitExceeded => "recursion limit exceeded",
            ErrorKind::UndeclaredIdentifier => "undeclared identifier",
            ErrorKind::MalformedInput => "malformed input",
        };
        f.write_str(name)
    }
}

/// A typed parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown operation `{name}` at token {position}")]
    UnknownOperation { name: String, position: usize },

    #[error("grammar mismatch in `{operation}` at token {position}: {message}")]
    GrammarMismatch {
        operation: String,
        position: usize,
        message: String,
    },

    #[error("recursion limit exceeded at token {position}")]
    RecursionLimitExceeded { position: usize },

    #[error("undeclared identifier `{name}` at token {position}")]
    UndeclaredIdentifier { name: String, position: usize },

    #[error("malformed input at token {position}: {message}")]
    MalformedInput { position: usize, message: String },
}

impl ParseError {
    pub fn unknown_operation(name: impl Into<String>, position: usize) -> Self {
        ParseError::UnknownOperation {
            name: name.into(),
            position,
        }
    }

    pub fn grammar_mismatch(
        operation: impl Into<String>,
        position: usize,
        message: impl Into<String>,
    ) -> Self {
        ParseError::GrammarMismatch {
            operation: operation.into(),
            position,
            message: message.into(),
        }
    }

    pub fn undeclared(name: impl Into<String>, position: usize) -> Self {
        ParseError::UndeclaredIdentifier {
            name: name.into(),
            position,
        }
    }

    pub fn malformed(position: usize, message: impl Into<String>) -> Self {
        ParseError::MalformedInput {
            position,
            message: message.into(),
        }
    }

    /// The category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            ParseError::GrammarMismatch { .. } => ErrorKind::GrammarMismatch,
            ParseError::RecursionLimitExceeded { .. } => ErrorKind::RecursionLimitExceeded,
            ParseError::UndeclaredIdentifier { .. } => ErrorKind::UndeclaredIdentifier,
            ParseError::MalformedInput { .. } => ErrorKind::MalformedInput,
        }
    }

    /// Token index at which the failure was detected.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnknownOperation { position, .. }
            | ParseError::GrammarMismatch { position, .. }
            | ParseError::RecursionLimitExceeded { position }
            | ParseError::UndeclaredIdentifier { position, .. }
            | ParseError::MalformedInput { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = ParseError::undeclared("x", 3);
        assert_eq!(err.kind(), ErrorKind::UndeclaredIdentifier);
        assert_eq!(err.position(), 3);

        let err = ParseError::RecursionLimitExceeded { position: 7 };
        assert_eq!(err.kind(), ErrorKind::RecursionLimitExceeded);
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = ParseError::unknown_operation("Jump", 0);
        assert_eq!(err.to_string(), "unknown operation `Jump` at token 0");

        let err = ParseError::grammar_mismatch("Print", 4, "expected 1 operand");
        assert_eq!(
            err.to_string(),
            "grammar mismatch in `Print` at token 4: expected 1 operand"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::MalformedInput.to_string(), "malformed input");
    }
}
