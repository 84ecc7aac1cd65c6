//! Tokenizer for generator input.
//!
//! Uses Logos. The lexer only classifies raw text; whether a word names an
//! operation or a variable is decided later against the grammar.

use std::ops::Range;

use logos::Logos;
use serde::Serialize;

use crate::error::{ParseError, Status};

/// Raw token classes.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    /// Decimal integer literal, optionally negative.
    #[regex(r"-?[0-9]+")]
    Integer,

    /// Identifier-shaped word: variable names and named operations.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    /// Run of operator punctuation such as `+`, `=`, `;` or `<-`.
    #[regex(r"[+\-*/%=<>!&|\^~:@$.,;?()\[\]{}]+")]
    Symbol,
}

/// A lexed token with its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the source; empty for synthesized tokens.
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Build a token from bare text, classifying it the way the lexer would.
    ///
    /// Text that does not lex as a single token is kept as a symbol.
    pub fn synthesize(text: &str) -> Self {
        let mut lexer = TokenKind::lexer(text);
        let kind = match (lexer.next(), lexer.next()) {
            (Some(Ok(kind)), None) => kind,
            _ => TokenKind::Symbol,
        };
        Token::new(kind, text, 0..0)
    }

    pub fn is_integer(&self) -> bool {
        self.kind == TokenKind::Integer
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// Tokenize `source`, failing on the first character no rule accepts.
pub fn tokenize(source: &str) -> Status<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token::new(kind, lexer.slice(), span)),
            Err(()) => {
                return Err(ParseError::malformed(
                    tokens.len(),
                    format!(
                        "unrecognized input `{}` at byte {}",
                        lexer.slice(),
                        span.start
                    ),
                ))
            }
        }
    }

    Ok(tokens)
}
