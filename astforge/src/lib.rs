//! astforge: grammar-driven program generator
//!
//! Builds typed instruction trees for a small process-control test language
//! from prefix-notation tokens, following a grammar loaded from YAML or TOML.
//! A seeded corruption path can turn some instructions into deliberately
//! invalid ones, for exercising downstream validators.
//!
//! # Architecture
//!
//! ```text
//! source ─► lexer ─► TokenReader ─► Parser ─► Vec<Instruction>
//!                                     │
//!                     Grammar ────────┤
//!                     IdentifierRegister + VariableIdAllocator
//! ```
//!
//! # Example
//!
//! ```
//! use astforge::{Grammar, IdentifierRegister, Parser, TokenReader, VariableIdAllocator};
//!
//! let grammar = Grammar::from_yaml_str(r#"
//! terminator: ";"
//! instructions:
//!   - { name: Assignment, token: let, operands: [assignment] }
//! expressions:
//!   - { name: Addition, token: "+", kind: arithmetic, operator: add }
//! "#).unwrap();
//!
//! let mut parser = Parser::new(grammar);
//! parser.set_pure_run();
//!
//! let mut reader = TokenReader::from_source("let x + 1 2 ;").unwrap();
//! let mut instructions = Vec::new();
//! let mut register = IdentifierRegister::new();
//! let mut allocator = VariableIdAllocator::new();
//!
//! parser
//!     .get_instruction(&mut reader, &mut instructions, &mut register, &mut allocator)
//!     .unwrap();
//! assert_eq!(instructions[0].to_string(), "Assignment (x#0 = (1 + 2))");
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod reader;
pub mod symbols;

pub use ast::{Expression, Instruction, Mutation};
pub use config::{CorruptionConfig, GeneratorConfig, DEFAULT_MAX_RECURSION_DEPTH};
pub use error::{ErrorKind, ParseError, Status};
pub use grammar::{Grammar, GrammarError};
pub use parser::{ParseAllError, Parser};
pub use reader::{Reader, TokenReader};
pub use symbols::{IdentifierRegister, VariableId, VariableIdAllocator};
