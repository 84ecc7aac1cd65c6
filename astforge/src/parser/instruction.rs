//! Instruction construction from grammar rules.

use super::Parser;
use crate::ast::{Expression, Instruction};
use crate::error::{ParseError, Status};
use crate::grammar::{InstructionRule, OperandKind};
use crate::reader::Reader;
use crate::symbols::{IdentifierRegister, VariableIdAllocator};

impl Parser {
    /// Build the instruction described by `rule` from the tokens that follow
    /// its operation token.
    ///
    /// Operands are read slot by slot. An `assignment` slot reads its target
    /// and value directly; any other slot reads a full expression and checks
    /// its kind. If the grammar has a terminator it must close the statement.
    pub(super) fn get_instruction_closure<R: Reader + ?Sized>(
        &self,
        rule: &InstructionRule,
        reader: &mut R,
        allocator: &mut VariableIdAllocator,
        register: &mut IdentifierRegister,
        max_recursion_depth: usize,
    ) -> Status<Instruction> {
        let mut operands = Vec::with_capacity(rule.operands.len());

        for (slot, kind) in rule.operands.iter().enumerate() {
            let position = reader.position();
            let operand = match kind {
                OperandKind::Assignment => {
                    // The assignment node itself costs one level.
                    if max_recursion_depth == 0 {
                        return Err(ParseError::RecursionLimitExceeded { position });
                    }
                    let (target, value) = self.get_assignment_operands(
                        register,
                        reader,
                        allocator,
                        max_recursion_depth - 1,
                    )?;
                    Expression::assignment(target, value)
                }
                kind => {
                    let expression =
                        self.get_expression(reader, allocator, register, max_recursion_depth)?;
                    if !kind.admits(&expression) {
                        return Err(ParseError::grammar_mismatch(
                            &rule.name,
                            position,
                            format!(
                                "operand {} must be {}, found {}",
                                slot + 1,
                                kind.name(),
                                expression.kind_name()
                            ),
                        ));
                    }
                    expression
                }
            };
            operands.push(operand);
        }

        if let Some(terminator) = self.grammar.terminator() {
            let position = reader.position();
            match reader.next_token() {
                Some(token) if token.text == terminator => {}
                Some(token) => {
                    return Err(ParseError::grammar_mismatch(
                        &rule.name,
                        position,
                        format!(
                            "expected `{}` after {} operand(s), found `{}`",
                            terminator,
                            rule.operands.len(),
                            token.text
                        ),
                    ))
                }
                None => {
                    return Err(ParseError::malformed(
                        position,
                        format!("expected `{}`, found end of input", terminator),
                    ))
                }
            }
        }

        Ok(Instruction::well_formed(rule.name.clone(), operands))
    }
}
