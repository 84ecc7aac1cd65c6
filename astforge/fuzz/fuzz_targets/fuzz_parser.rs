//! Fuzz target for raw generator input.
//!
//! Feeds arbitrary text through the lexer and the parser with corruption
//! enabled. Generation may fail, but must never panic, and a failed attempt
//! must leave the session exactly as it found it.

#![no_main]

use libfuzzer_sys::fuzz_target;
use astforge::{
    CorruptionConfig, Grammar, IdentifierRegister, Parser, Reader, TokenReader, VariableIdAllocator,
};

const GRAMMAR: &str = include_str!("../../grammars/default.yaml");

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut reader) = TokenReader::from_source(source) else {
        return;
    };
    let Ok(grammar) = Grammar::from_yaml_str(GRAMMAR) else {
        return;
    };

    let seed = data.len() as u64;
    let parser = Parser::new(grammar).with_corruption(CorruptionConfig { rate: 0.25, seed });
    let mut instructions = Vec::new();
    let mut register = IdentifierRegister::new();
    let mut allocator = VariableIdAllocator::new();

    while !reader.is_at_end() {
        let position = reader.position();
        let emitted = instructions.len();
        let registered = register.len();

        if parser
            .get_instruction_with_depth(
                &mut reader,
                &mut instructions,
                &mut register,
                &mut allocator,
                16,
            )
            .is_err()
        {
            assert_eq!(reader.position(), position);
            assert_eq!(instructions.len(), emitted);
            assert_eq!(register.len(), registered);
            reader.next_token();
        }
    }
});
