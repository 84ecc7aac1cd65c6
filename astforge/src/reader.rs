//! Token cursor the parser pulls from.
//!
//! The parser never seeks backwards on a successful path. A failed
//! `get_instruction` rewinds to the position where the attempt began, so the
//! same input can be retried against a different grammar or budget.

use crate::error::Status;
use crate::lexer::{tokenize, Token};

/// Pull cursor over tokens.
pub trait Reader {
    /// The next token without consuming it.
    fn peek(&self) -> Option<&Token>;

    /// Consume and return the next token.
    fn next_token(&mut self) -> Option<Token>;

    /// Index of the next token.
    fn position(&self) -> usize;

    /// Move the cursor back to `position`, previously returned by
    /// [`position`](Reader::position).
    fn rewind(&mut self, position: usize);

    fn is_at_end(&self) -> bool {
        self.peek().is_none()
    }
}

/// [`Reader`] over an in-memory token vector.
#[derive(Debug, Clone, Default)]
pub struct TokenReader {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Lex `source` and read from the resulting tokens.
    pub fn from_source(source: &str) -> Status<Self> {
        Ok(Self::new(tokenize(source)?))
    }

    /// Read pre-split words, classifying each as the lexer would.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        Self::new(words.iter().map(|w| Token::synthesize(w.as_ref())).collect())
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.cursor..]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Reader for TokenReader {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(token)
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn rewind(&mut self, position: usize) {
        self.cursor = position.min(self.tokens.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = TokenReader::from_words(&["print", "1"]);
        assert_eq!(reader.peek().unwrap().text, "print");
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.next_token().unwrap().text, "print");
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_end_of_input() {
        let mut reader = TokenReader::from_words(&["x"]);
        reader.next_token();
        assert!(reader.is_at_end());
        assert!(reader.next_token().is_none());
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_rewind() {
        let mut reader = TokenReader::from_source("let x + 1 2").unwrap();
        let start = reader.position();
        reader.next_token();
        reader.next_token();
        reader.rewind(start);
        assert_eq!(reader.remaining().len(), 5);
        assert_eq!(reader.peek().unwrap().text, "let");
    }
}
