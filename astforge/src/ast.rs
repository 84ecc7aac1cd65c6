//! Generated program trees.
//!
//! Both node families are closed sum types. Every node owns its children;
//! identifier references carry a name and id rather than pointing back into
//! the tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols::VariableId;

/// Binary arithmetic operators a grammar rule may stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
        }
    }
}

/// A named variable together with its session identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub name: String,
    pub id: VariableId,
}

impl Identifier {
    pub fn new(name: impl Into<String>, id: VariableId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Back-reference to the identifier that declared the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PpidReference {
    pub name: String,
    pub id: VariableId,
}

/// Terminal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "leaf", rename_all = "snake_case")]
pub enum Leaf {
    Integer { value: i64 },
    Variable(Identifier),
}

/// A value-producing subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "expression", rename_all = "snake_case")]
pub enum Expression {
    Arithmetic {
        /// Grammar rule that produced the node, e.g. `Addition`.
        operation: String,
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Assignment {
        target: Identifier,
        value: Box<Expression>,
    },
    Ppid(PpidReference),
    Leaf(Leaf),
}

impl Expression {
    pub fn integer(value: i64) -> Self {
        Expression::Leaf(Leaf::Integer { value })
    }

    pub fn variable(name: impl Into<String>, id: VariableId) -> Self {
        Expression::Leaf(Leaf::Variable(Identifier::new(name, id)))
    }

    pub fn arithmetic(
        operation: impl Into<String>,
        operator: BinaryOperator,
        left: Expression,
        right: Expression,
    ) -> Self {
        Expression::Arithmetic {
            operation: operation.into(),
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assignment(target: Identifier, value: Expression) -> Self {
        Expression::Assignment {
            target,
            value: Box::new(value),
        }
    }

    /// Short name of the variant, as used in grammar operand slots.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Arithmetic { .. } => "arithmetic",
            Expression::Assignment { .. } => "assignment",
            Expression::Ppid(_) => "ppid",
            Expression::Leaf(Leaf::Integer { .. }) => "literal",
            Expression::Leaf(Leaf::Variable(_)) => "variable",
        }
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Arithmetic { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expression::Assignment { value, .. } => 1 + value.depth(),
            Expression::Ppid(_) | Expression::Leaf(_) => 1,
        }
    }

    /// Visit every identity this subtree refers to or declares.
    pub fn for_each_identifier(&self, f: &mut impl FnMut(&str, VariableId)) {
        match self {
            Expression::Arithmetic { left, right, .. } => {
                left.for_each_identifier(f);
                right.for_each_identifier(f);
            }
            Expression::Assignment { target, value } => {
                f(&target.name, target.id);
                value.for_each_identifier(f);
            }
            Expression::Ppid(reference) => f(&reference.name, reference.id),
            Expression::Leaf(Leaf::Variable(identifier)) => f(&identifier.name, identifier.id),
            Expression::Leaf(Leaf::Integer { .. }) => {}
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Arithmetic {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expression::Assignment { target, value } => {
                write!(f, "({}{} = {})", target.name, target.id, value)
            }
            Expression::Ppid(reference) => write!(f, "ppid({}{})", reference.name, reference.id),
            Expression::Leaf(Leaf::Integer { value }) => write!(f, "{}", value),
            Expression::Leaf(Leaf::Variable(identifier)) => {
                write!(f, "{}{}", identifier.name, identifier.id)
            }
        }
    }
}

/// How a corrupted instruction departs from the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    /// A leaf or PPID reference was redirected to an identifier never declared.
    UndeclaredReference,
    /// The last operand was removed.
    DroppedOperand,
    /// An operand beyond the declared arity was appended.
    ExtraOperand,
}

impl Mutation {
    pub const ALL: [Mutation; 3] = [
        Mutation::UndeclaredReference,
        Mutation::DroppedOperand,
        Mutation::ExtraOperand,
    ];
}

/// One statement-level node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "instruction", rename_all = "snake_case")]
pub enum Instruction {
    /// Conforms to the grammar's declared shape.
    WellFormed {
        operation: String,
        operands: Vec<Expression>,
    },
    /// Deliberately invalid output of the corruption path.
    Corrupted {
        operation: String,
        operands: Vec<Expression>,
        mutation: Mutation,
    },
}

impl Instruction {
    pub fn well_formed(operation: impl Into<String>, operands: Vec<Expression>) -> Self {
        Instruction::WellFormed {
            operation: operation.into(),
            operands,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            Instruction::WellFormed { operation, .. }
            | Instruction::Corrupted { operation, .. } => operation,
        }
    }

    pub fn operands(&self) -> &[Expression] {
        match self {
            Instruction::WellFormed { operands, .. } | Instruction::Corrupted { operands, .. } => {
                operands
            }
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, Instruction::Corrupted { .. })
    }

    pub fn mutation(&self) -> Option<Mutation> {
        match self {
            Instruction::Corrupted { mutation, .. } => Some(*mutation),
            Instruction::WellFormed { .. } => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_corrupted() {
            f.write_str("!")?;
        }
        f.write_str(self.operation())?;
        for operand in self.operands() {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addition(left: Expression, right: Expression) -> Expression {
        Expression::arithmetic("Addition", BinaryOperator::Add, left, right)
    }

    #[test]
    fn test_depth() {
        assert_eq!(Expression::integer(1).depth(), 1);
        assert_eq!(addition(Expression::integer(1), Expression::integer(2)).depth(), 2);

        let nested = addition(
            addition(Expression::integer(1), Expression::integer(2)),
            Expression::integer(3),
        );
        assert_eq!(nested.depth(), 3);

        let assign = Expression::assignment(Identifier::new("x", VariableId::new(0)), nested);
        assert_eq!(assign.depth(), 4);
    }

    #[test]
    fn test_for_each_identifier() {
        let expr = Expression::assignment(
            Identifier::new("y", VariableId::new(1)),
            addition(
                Expression::variable("x", VariableId::new(0)),
                Expression::Ppid(PpidReference {
                    name: "x".into(),
                    id: VariableId::new(0),
                }),
            ),
        );

        let mut seen = Vec::new();
        expr.for_each_identifier(&mut |name, id| seen.push((name.to_string(), id.index())));
        assert_eq!(
            seen,
            vec![("y".to_string(), 1), ("x".to_string(), 0), ("x".to_string(), 0)]
        );
    }

    #[test]
    fn test_display() {
        let instruction = Instruction::well_formed(
            "Assignment",
            vec![Expression::assignment(
                Identifier::new("x", VariableId::new(0)),
                addition(Expression::integer(1), Expression::integer(2)),
            )],
        );
        assert_eq!(instruction.to_string(), "Assignment (x#0 = (1 + 2))");
    }

    #[test]
    fn test_instruction_accessors() {
        let instruction = Instruction::Corrupted {
            operation: "Print".into(),
            operands: vec![],
            mutation: Mutation::DroppedOperand,
        };
        assert!(instruction.is_corrupted());
        assert_eq!(instruction.mutation(), Some(Mutation::DroppedOperand));
        assert_eq!(instruction.operation(), "Print");
        assert!(instruction.operands().is_empty());
        assert_eq!(instruction.to_string(), "!Print");
    }
}
