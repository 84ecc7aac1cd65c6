//! Corruption path.
//!
//! Turns a freshly built instruction into a deliberately invalid one. Only
//! the emitted tree changes: names the statement declared stay registered
//! with the ids they were given.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::Parser;
use crate::ast::{Expression, Instruction, Mutation};
use crate::symbols::VariableId;

/// Name given to references redirected by [`Mutation::UndeclaredReference`].
pub const UNDECLARED_NAME: &str = "__undeclared";

impl Parser {
    /// Apply one randomly chosen mutation to `instruction`.
    pub(super) fn corrupt_statement(
        &self,
        instruction: Instruction,
        rng: &mut StdRng,
    ) -> Instruction {
        let (operation, mut operands) = match instruction {
            Instruction::WellFormed {
                operation,
                operands,
            }
            | Instruction::Corrupted {
                operation,
                operands,
                ..
            } => (operation, operands),
        };

        let mut mutation = Mutation::ALL[rng.gen_range(0..Mutation::ALL.len())];
        match mutation {
            Mutation::UndeclaredReference => {
                if !operands.iter_mut().any(redirect_first_reference) {
                    operands.push(undeclared());
                }
            }
            Mutation::DroppedOperand => {
                if operands.pop().is_none() {
                    mutation = Mutation::ExtraOperand;
                    operands.push(Expression::integer(rng.gen_range(0..100)));
                }
            }
            Mutation::ExtraOperand => {
                operands.push(Expression::integer(rng.gen_range(0..100)));
            }
        }

        debug!("Corrupted {} with {:?}", operation, mutation);
        Instruction::Corrupted {
            operation,
            operands,
            mutation,
        }
    }
}

fn undeclared() -> Expression {
    Expression::variable(UNDECLARED_NAME, VariableId::UNBOUND)
}

/// Replace the first leaf or PPID reference, depth first, with a reference
/// to an undeclared identifier. Returns false if the tree has no such node.
fn redirect_first_reference(expression: &mut Expression) -> bool {
    match expression {
        Expression::Arithmetic { left, right, .. } => {
            redirect_first_reference(left) || redirect_first_reference(right)
        }
        Expression::Assignment { value, .. } => redirect_first_reference(value),
        Expression::Ppid(_) | Expression::Leaf(_) => {
            *expression = undeclared();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Identifier};
    use crate::grammar::{Grammar, OperandKind};
    use rand::SeedableRng;

    fn parser() -> Parser {
        let grammar = Grammar::builder()
            .instruction("Print", Some("print"), [OperandKind::Any])
            .build()
            .unwrap();
        Parser::new(grammar)
    }

    fn contains_undeclared(expression: &Expression) -> bool {
        let mut found = false;
        expression.for_each_identifier(&mut |name, id| {
            found |= name == UNDECLARED_NAME && id == VariableId::UNBOUND;
        });
        found
    }

    #[test]
    fn test_redirect_first_reference_is_depth_first() {
        let mut expression = Expression::assignment(
            Identifier::new("x", VariableId::new(0)),
            Expression::arithmetic(
                "Addition",
                BinaryOperator::Add,
                Expression::integer(1),
                Expression::integer(2),
            ),
        );
        assert!(redirect_first_reference(&mut expression));
        assert_eq!(
            expression,
            Expression::assignment(
                Identifier::new("x", VariableId::new(0)),
                Expression::arithmetic(
                    "Addition",
                    BinaryOperator::Add,
                    undeclared(),
                    Expression::integer(2),
                ),
            )
        );
    }

    #[test]
    fn test_every_mutation_departs_from_the_original() {
        let parser = parser();
        let original = Instruction::well_formed(
            "Print",
            vec![Expression::arithmetic(
                "Addition",
                BinaryOperator::Add,
                Expression::integer(1),
                Expression::integer(2),
            )],
        );

        let mut seen = Vec::new();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let corrupted = parser.corrupt_statement(original.clone(), &mut rng);
            assert_eq!(corrupted.operation(), "Print");

            let mutation = corrupted.mutation().unwrap();
            match mutation {
                Mutation::UndeclaredReference => {
                    assert_eq!(corrupted.operands().len(), 1);
                    assert!(contains_undeclared(&corrupted.operands()[0]));
                }
                Mutation::DroppedOperand => assert!(corrupted.operands().is_empty()),
                Mutation::ExtraOperand => assert_eq!(corrupted.operands().len(), 2),
            }
            if !seen.contains(&mutation) {
                seen.push(mutation);
            }
        }
        assert_eq!(seen.len(), Mutation::ALL.len());
    }

    #[test]
    fn test_nullary_instruction_gains_an_operand() {
        let parser = parser();
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let corrupted =
                parser.corrupt_statement(Instruction::well_formed("Fork", vec![]), &mut rng);
            assert!(corrupted.is_corrupted());
            assert_eq!(corrupted.operands().len(), 1);
        }
    }
}
