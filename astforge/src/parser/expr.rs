//! Expression parsing.
//!
//! Every builder takes the remaining recursion budget. `get_expression` spends
//! one level per node it builds and hands `budget - 1` to the operand builders,
//! which pass it on unchanged to their nested `get_expression` calls.

use tracing::trace;

use super::Parser;
use crate::ast::{Expression, Identifier, PpidReference};
use crate::error::{ParseError, Status};
use crate::grammar::ExpressionForm;
use crate::reader::Reader;
use crate::symbols::{IdentifierRegister, VariableIdAllocator};

impl Parser {
    /// Parse one expression.
    ///
    /// Fails with `RecursionLimitExceeded` before reading anything when the
    /// budget is spent.
    pub(super) fn get_expression<R: Reader + ?Sized>(
        &self,
        reader: &mut R,
        allocator: &mut VariableIdAllocator,
        register: &mut IdentifierRegister,
        max_recursion_depth: usize,
    ) -> Status<Expression> {
        let position = reader.position();
        if max_recursion_depth == 0 {
            return Err(ParseError::RecursionLimitExceeded { position });
        }

        let token = self.expect_token(reader, "an expression")?;
        let nested = max_recursion_depth - 1;

        // Integer literal
        if token.is_integer() {
            let value = token.text.parse::<i64>().map_err(|_| {
                ParseError::malformed(
                    position,
                    format!("integer literal `{}` out of range", token.text),
                )
            })?;
            return Ok(Expression::integer(value));
        }

        // Grammar-defined expression
        if let Some(rule) = self.grammar.expression(&token.text) {
            trace!("{} at token {} (budget {})", rule.name, position, max_recursion_depth);
            return match rule.form {
                ExpressionForm::Arithmetic { operator } => {
                    let (left, right) =
                        self.get_binary_operator_operands(reader, allocator, register, nested)?;
                    Ok(Expression::arithmetic(rule.name.clone(), operator, left, right))
                }
                ExpressionForm::Assignment => {
                    let (target, value) =
                        self.get_assignment_operands(register, reader, allocator, nested)?;
                    Ok(Expression::assignment(target, value))
                }
                ExpressionForm::Ppid => {
                    let reference = self.get_variable_ppid(register, &token.text, position)?;
                    Ok(Expression::Ppid(reference))
                }
            };
        }

        // Statement ended before every operand was supplied
        if self.grammar.terminator() == Some(token.text.as_str()) {
            return Err(ParseError::grammar_mismatch(
                "expression",
                position,
                format!("expected an operand, found terminator `{}`", token.text),
            ));
        }

        // Variable reference
        if token.is_word() && !self.grammar.is_reserved(&token.text) {
            return match register.get(&token.text) {
                Some(entry) if entry.is_declared() => {
                    Ok(Expression::variable(token.text, entry.id))
                }
                _ => Err(ParseError::undeclared(token.text, position)),
            };
        }

        Err(ParseError::unknown_operation(token.text, position))
    }

    /// Parse the left and then the right operand of an arithmetic node.
    pub(super) fn get_binary_operator_operands<R: Reader + ?Sized>(
        &self,
        reader: &mut R,
        allocator: &mut VariableIdAllocator,
        register: &mut IdentifierRegister,
        max_recursion_depth: usize,
    ) -> Status<(Expression, Expression)> {
        let left = self.get_expression(reader, allocator, register, max_recursion_depth)?;
        let right = self.get_expression(reader, allocator, register, max_recursion_depth)?;
        Ok((left, right))
    }

    /// Parse an assignment target and its value.
    ///
    /// A new target is registered as pending before the value is parsed and
    /// only becomes visible to references once the value succeeds. A known
    /// target keeps its id. Nothing is undone here on failure: the enclosing
    /// `get_instruction` rolls the register back.
    pub(super) fn get_assignment_operands<R: Reader + ?Sized>(
        &self,
        register: &mut IdentifierRegister,
        reader: &mut R,
        allocator: &mut VariableIdAllocator,
        max_recursion_depth: usize,
    ) -> Status<(Identifier, Expression)> {
        let position = reader.position();
        let token = self.expect_token(reader, "an assignment target")?;
        if !token.is_word() || self.grammar.is_reserved(&token.text) {
            return Err(ParseError::grammar_mismatch(
                "assignment",
                position,
                format!("expected an identifier, found `{}`", token.text),
            ));
        }

        let (id, fresh) = register.register(&token.text, allocator);
        if fresh {
            trace!("Registered {} as {}", token.text, id);
        }

        let value = self.get_expression(reader, allocator, register, max_recursion_depth)?;
        register.declare(&token.text);

        Ok((Identifier::new(token.text, id), value))
    }

    /// Resolve a PPID reference to the most recently declared identifier.
    pub(super) fn get_variable_ppid(
        &self,
        register: &IdentifierRegister,
        token: &str,
        position: usize,
    ) -> Status<PpidReference> {
        register
            .latest_declared()
            .map(|(name, entry)| PpidReference {
                name: name.to_string(),
                id: entry.id,
            })
            .ok_or_else(|| ParseError::undeclared(token, position))
    }
}
