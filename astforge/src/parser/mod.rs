//! Grammar-driven instruction generator.
//!
//! The parser reads prefix-notation tokens and builds one [`Instruction`] per
//! call to [`Parser::get_instruction`]:
//!
//! ```text
//! let x + 1 2 ;      =>  Assignment(x#0 = (1 + 2))
//! print PPID ;       =>  Print(ppid(x#0))
//! ```
//!
//! # Attempts
//!
//! Each call is one bounded recursive descent. Before it starts, the parser
//! records the reader position and checkpoints the caller's register and
//! allocator. A failed attempt restores all three, so nothing half-built
//! reaches the caller and the same input can be retried.
//!
//! # Corruption
//!
//! Unless [`Parser::set_pure_run`] has been called, a seeded roll may route
//! an instruction through the corruption path. The instruction is first built
//! as usual, so the reader, register and allocator advance exactly as for a
//! well-formed statement. Only the emitted tree is mutated.
//!
//! # Submodules
//!
//! - `expr`: expression builders
//! - `instruction`: grammar-shaped instruction construction
//! - `corrupt`: mutations applied on the corruption path

mod corrupt;
mod expr;
mod instruction;

pub use corrupt::UNDECLARED_NAME;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::ast::Instruction;
use crate::config::{CorruptionConfig, GeneratorConfig, DEFAULT_MAX_RECURSION_DEPTH};
use crate::error::{ParseError, Status};
use crate::grammar::Grammar;
use crate::lexer::Token;
use crate::reader::Reader;
use crate::symbols::{IdentifierRegister, VariableIdAllocator};

/// A session stopped at its first failing instruction.
#[derive(Debug, Error)]
#[error("{error} (after {} instructions)", .instructions.len())]
pub struct ParseAllError {
    #[source]
    pub error: ParseError,
    /// Instructions produced before the failure.
    pub instructions: Vec<Instruction>,
}

/// Builds instructions from a reader according to a grammar.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    corruption: CorruptionConfig,
    pure_run: bool,
}

impl Parser {
    /// Create a parser with the default corruption settings.
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            corruption: CorruptionConfig::default(),
            pure_run: false,
        }
    }

    /// Create a parser from a loaded configuration.
    pub fn with_config(grammar: Grammar, config: &GeneratorConfig) -> Self {
        let mut parser = Self::new(grammar).with_corruption(config.corruption);
        if config.pure_run {
            parser.set_pure_run();
        }
        parser
    }

    /// Replace the corruption settings.
    pub fn with_corruption(mut self, corruption: CorruptionConfig) -> Self {
        self.corruption = corruption;
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn is_pure_run(&self) -> bool {
        self.pure_run
    }

    /// Permanently disable the corruption path for this parser.
    pub fn set_pure_run(&mut self) {
        self.pure_run = true;
    }

    /// Parse one instruction with the default recursion bound.
    pub fn get_instruction<R: Reader + ?Sized>(
        &self,
        reader: &mut R,
        instructions: &mut Vec<Instruction>,
        register: &mut IdentifierRegister,
        allocator: &mut VariableIdAllocator,
    ) -> Status {
        self.get_instruction_with_depth(
            reader,
            instructions,
            register,
            allocator,
            DEFAULT_MAX_RECURSION_DEPTH,
        )
    }

    /// Parse one instruction and append it to `instructions`.
    ///
    /// On failure `instructions`, `register` and `allocator` are unchanged and
    /// the reader is rewound to where the attempt began.
    pub fn get_instruction_with_depth<R: Reader + ?Sized>(
        &self,
        reader: &mut R,
        instructions: &mut Vec<Instruction>,
        register: &mut IdentifierRegister,
        allocator: &mut VariableIdAllocator,
        max_recursion_depth: usize,
    ) -> Status {
        let start = reader.position();
        let register_checkpoint = register.checkpoint();
        let allocator_checkpoint = allocator.checkpoint();

        let built = self
            .expect_token(reader, "an instruction")
            .and_then(|token| {
                self.dispatch(token, start, reader, allocator, register, max_recursion_depth)
            });

        let instruction = match built {
            Ok(instruction) => instruction,
            Err(error) => {
                debug!("Instruction at token {} failed: {}", start, error);
                reader.rewind(start);
                register.rollback(register_checkpoint);
                allocator.rollback(allocator_checkpoint);
                return Err(error);
            }
        };

        // The statement was consumed, so its symbol effects stand even when
        // the emitted tree is mutated.
        let instruction = match self.corruption_roll(instructions.len(), start) {
            Some(mut rng) => self.corrupt_statement(instruction, &mut rng),
            None => instruction,
        };

        instructions.push(instruction);
        Ok(())
    }

    /// Parse instructions until the reader is exhausted.
    pub fn parse_all<R: Reader + ?Sized>(
        &self,
        reader: &mut R,
        register: &mut IdentifierRegister,
        allocator: &mut VariableIdAllocator,
        max_recursion_depth: usize,
    ) -> Result<Vec<Instruction>, ParseAllError> {
        let mut instructions = Vec::new();
        while !reader.is_at_end() {
            if let Err(error) = self.get_instruction_with_depth(
                reader,
                &mut instructions,
                register,
                allocator,
                max_recursion_depth,
            ) {
                return Err(ParseAllError {
                    error,
                    instructions,
                });
            }
        }
        Ok(instructions)
    }

    /// Resolve the operation token against the grammar and build it.
    fn dispatch<R: Reader + ?Sized>(
        &self,
        token: Token,
        position: usize,
        reader: &mut R,
        allocator: &mut VariableIdAllocator,
        register: &mut IdentifierRegister,
        max_recursion_depth: usize,
    ) -> Status<Instruction> {
        let rule = self
            .grammar
            .instruction(&token.text)
            .ok_or_else(|| ParseError::unknown_operation(&token.text, position))?;

        debug!("Parsing {} at token {}", rule.name, position);
        self.get_instruction_closure(rule, reader, allocator, register, max_recursion_depth)
    }

    /// Decide whether the instruction emitted as number `emitted`, starting at
    /// reader position `position`, takes the corruption path.
    ///
    /// The roll depends only on the seed and those two values, so a session
    /// replayed with the same seed corrupts the same instructions.
    fn corruption_roll(&self, emitted: usize, position: usize) -> Option<StdRng> {
        let rate = self.corruption.rate;
        if self.pure_run || rate.is_nan() || rate <= 0.0 {
            return None;
        }

        let stream = (emitted as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (position as u64).rotate_left(32);
        let mut rng = StdRng::seed_from_u64(self.corruption.seed ^ stream);
        rng.gen_bool(rate.min(1.0)).then_some(rng)
    }

    /// Consume the next token or report what was expected.
    fn expect_token<R: Reader + ?Sized>(&self, reader: &mut R, expected: &str) -> Status<Token> {
        let position = reader.position();
        reader.next_token().ok_or_else(|| {
            ParseError::malformed(position, format!("expected {}, found end of input", expected))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Expression, Identifier};
    use crate::error::ErrorKind;
    use crate::grammar::{ExpressionForm, OperandKind};
    use crate::reader::TokenReader;
    use crate::symbols::VariableId;
    use pretty_assertions::assert_eq;

    fn grammar() -> Grammar {
        Grammar::builder()
            .instruction("Assignment", Some("let"), [OperandKind::Assignment])
            .instruction("Print", Some("print"), [OperandKind::Any])
            .arithmetic("Addition", "+", BinaryOperator::Add)
            .expression("ParentPid", Some("PPID"), ExpressionForm::Ppid)
            .build()
            .unwrap()
    }

    fn pure_parser() -> Parser {
        let mut parser = Parser::new(grammar());
        parser.set_pure_run();
        parser
    }

    #[test]
    fn test_assignment_scenario() {
        let parser = pure_parser();
        let mut reader = TokenReader::from_source("let x + 1 2").unwrap();
        let mut instructions = Vec::new();
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        parser
            .get_instruction(&mut reader, &mut instructions, &mut register, &mut allocator)
            .unwrap();

        assert_eq!(
            instructions,
            vec![Instruction::well_formed(
                "Assignment",
                vec![Expression::assignment(
                    Identifier::new("x", VariableId::new(0)),
                    Expression::arithmetic(
                        "Addition",
                        BinaryOperator::Add,
                        Expression::integer(1),
                        Expression::integer(2),
                    ),
                )],
            )]
        );
        assert_eq!(register.get("x").unwrap().id, VariableId::new(0));
        assert!(register.is_declared("x"));
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_unknown_operation() {
        let parser = pure_parser();
        let mut reader = TokenReader::from_words(&["jump", "1"]);
        let mut instructions = Vec::new();
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        let err = parser
            .get_instruction(&mut reader, &mut instructions, &mut register, &mut allocator)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOperation);
        assert!(instructions.is_empty());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let parser = pure_parser();
        let mut reader = TokenReader::default();
        let mut instructions = Vec::new();
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        let err = parser
            .get_instruction(&mut reader, &mut instructions, &mut register, &mut allocator)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_failure_rewinds_and_rolls_back() {
        let parser = pure_parser();
        // `y` is registered while its value is parsed, then the value fails.
        let mut reader = TokenReader::from_source("let x 1 let y + 1 PPID2").unwrap();
        let mut instructions = Vec::new();
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        parser
            .get_instruction(&mut reader, &mut instructions, &mut register, &mut allocator)
            .unwrap();
        let before = reader.position();

        let err = parser
            .get_instruction(&mut reader, &mut instructions, &mut register, &mut allocator)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UndeclaredIdentifier);
        assert_eq!(reader.position(), before);
        assert_eq!(instructions.len(), 1);
        assert_eq!(register.len(), 1);
        assert!(!register.contains("y"));
        assert_eq!(allocator.allocated(), 1);
    }

    #[test]
    fn test_parse_all_reports_progress() {
        let parser = pure_parser();
        let mut reader = TokenReader::from_source("let a 1 print a print b").unwrap();
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        let err = parser
            .parse_all(&mut reader, &mut register, &mut allocator, DEFAULT_MAX_RECURSION_DEPTH)
            .unwrap_err();
        assert_eq!(err.instructions.len(), 2);
        assert_eq!(err.error.kind(), ErrorKind::UndeclaredIdentifier);
        assert_eq!(err.to_string(), "undeclared identifier `b` at token 6 (after 2 instructions)");
    }

    #[test]
    fn test_with_config_pure_run() {
        let config = GeneratorConfig {
            pure_run: true,
            ..GeneratorConfig::default()
        };
        let parser = Parser::with_config(grammar(), &config);
        assert!(parser.is_pure_run());
    }

    #[test]
    fn test_corrupted_assignment_still_declares() {
        let corruption = CorruptionConfig {
            rate: 1.0,
            seed: 11,
        };
        let parser = Parser::new(grammar()).with_corruption(corruption);
        let mut reader = TokenReader::from_source("let x 1 let y + x 1 let x 2").unwrap();
        let mut register = IdentifierRegister::new();
        let mut allocator = VariableIdAllocator::new();

        let instructions = parser
            .parse_all(&mut reader, &mut register, &mut allocator, DEFAULT_MAX_RECURSION_DEPTH)
            .unwrap();

        assert_eq!(instructions.len(), 3);
        assert!(instructions.iter().all(Instruction::is_corrupted));
        assert_eq!(register.get("x").unwrap().id, VariableId::new(0));
        assert_eq!(register.get("y").unwrap().id, VariableId::new(1));
        assert!(register.is_declared("x") && register.is_declared("y"));
        assert_eq!(allocator.allocated(), 2);
    }

    #[test]
    fn test_corruption_roll_is_reproducible() {
        let corruption = CorruptionConfig {
            rate: 0.5,
            seed: 7,
        };
        let parser = Parser::new(grammar()).with_corruption(corruption);
        let rolls = || -> Vec<bool> {
            (0..32)
                .map(|n| parser.corruption_roll(n, n * 3).is_some())
                .collect()
        };
        let first = rolls();
        let second = rolls();
        assert_eq!(first, second);
        assert!(first.iter().any(|c| *c));
        assert!(first.iter().any(|c| !*c));
    }

    #[test]
    fn test_disabled_corruption_never_rolls() {
        let parser = Parser::new(grammar()).with_corruption(CorruptionConfig::disabled());
        assert!((0..64).all(|n| parser.corruption_roll(n, n).is_none()));
    }
}
