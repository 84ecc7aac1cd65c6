//! Structured input generators for fuzzing astforge.
//!
//! Random bytes rarely get past the first token of a statement. These types
//! implement `Arbitrary` to produce prefix-notation programs for the bundled
//! default grammar, well-formed or close to it, so the fuzzer spends its time
//! inside the expression builders and the rollback paths.
//!
//! - `FuzzProgram` - a sequence of statements
//! - `FuzzStatement` - one instruction of the default grammar
//! - `FuzzExpr` - a prefix expression tree
//! - `FuzzIdent` - a variable name that never collides with a grammar token

pub mod ident;
pub mod program;

pub use ident::*;
pub use program::*;
