//! Grammar-based fuzz target for the generator.
//!
//! Uses structured program generators to produce statements of the default
//! grammar, so most inputs reach the expression builders instead of failing
//! on the first token.

#![no_main]

use libfuzzer_sys::fuzz_target;
use astforge::{Grammar, IdentifierRegister, Parser, TokenReader, VariableIdAllocator};
use astforge_fuzz::FuzzProgram;

const GRAMMAR: &str = include_str!("../../grammars/default.yaml");

fuzz_target!(|program: FuzzProgram| {
    // Convert the structured program to source code
    let source = program.to_source();

    let Ok(grammar) = Grammar::from_yaml_str(GRAMMAR) else {
        return;
    };
    let mut parser = Parser::new(grammar);
    parser.set_pure_run();

    let Ok(mut reader) = TokenReader::from_source(&source) else {
        return;
    };
    let mut register = IdentifierRegister::new();
    let mut allocator = VariableIdAllocator::new();

    // Generated programs may reference names before assigning them; those
    // must come back as errors, never as panics.
    if let Ok(instructions) = parser.parse_all(&mut reader, &mut register, &mut allocator, 32) {
        assert!(instructions.iter().all(|i| !i.is_corrupted()));
        assert_eq!(allocator.allocated(), register.len() as u64);
    }
});
