//! Statement and expression generators for the default grammar.

use arbitrary::{Arbitrary, Unstructured};

use crate::ident::FuzzIdent;

/// Nesting beyond this is cut off with a literal.
const MAX_EXPR_DEPTH: usize = 8;

/// A prefix expression.
#[derive(Debug, Clone)]
pub enum FuzzExpr {
    Literal(i64),
    Variable(FuzzIdent),
    Ppid,
    Binary(&'static str, Box<FuzzExpr>, Box<FuzzExpr>),
    Assign(FuzzIdent, Box<FuzzExpr>),
}

impl FuzzExpr {
    fn generate(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Self> {
        const OPERATORS: &[&str] = &["+", "-", "*", "/", "%"];

        let choice: u8 = if depth >= MAX_EXPR_DEPTH { 0 } else { u.int_in_range(0..=5)? };
        Ok(match choice {
            0 => FuzzExpr::Literal(u.int_in_range(-1000..=1000)?),
            1 => FuzzExpr::Variable(u.arbitrary()?),
            2 => FuzzExpr::Ppid,
            3 => FuzzExpr::Assign(u.arbitrary()?, Box::new(Self::generate(u, depth + 1)?)),
            _ => {
                let idx: usize = u.arbitrary()?;
                FuzzExpr::Binary(
                    OPERATORS[idx % OPERATORS.len()],
                    Box::new(Self::generate(u, depth + 1)?),
                    Box::new(Self::generate(u, depth + 1)?),
                )
            }
        })
    }

    pub fn to_source(&self) -> String {
        match self {
            FuzzExpr::Literal(value) => value.to_string(),
            FuzzExpr::Variable(ident) => ident.to_source(),
            FuzzExpr::Ppid => "PPID".to_string(),
            FuzzExpr::Binary(op, left, right) => {
                format!("{} {} {}", op, left.to_source(), right.to_source())
            }
            FuzzExpr::Assign(target, value) => {
                format!("= {} {}", target.to_source(), value.to_source())
            }
        }
    }
}

impl<'a> Arbitrary<'a> for FuzzExpr {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Self::generate(u, 0)
    }
}

/// One statement of the default grammar.
#[derive(Debug, Clone, Arbitrary)]
pub enum FuzzStatement {
    Let(FuzzIdent, FuzzExpr),
    Print(FuzzExpr),
    Exit(i8),
    Kill(FuzzExpr, u8),
    Wait(FuzzIdent),
    Fork,
    /// Statement with its terminator left off.
    Unterminated(Box<FuzzStatement>),
}

impl FuzzStatement {
    fn body(&self) -> String {
        match self {
            FuzzStatement::Let(target, value) => {
                format!("let {} {}", target.to_source(), value.to_source())
            }
            FuzzStatement::Print(value) => format!("print {}", value.to_source()),
            FuzzStatement::Exit(code) => format!("exit {}", code),
            FuzzStatement::Kill(target, signal) => {
                format!("kill {} {}", target.to_source(), signal)
            }
            FuzzStatement::Wait(ident) => format!("wait {}", ident.to_source()),
            FuzzStatement::Fork => "fork".to_string(),
            FuzzStatement::Unterminated(inner) => inner.body(),
        }
    }

    pub fn to_source(&self) -> String {
        match self {
            FuzzStatement::Unterminated(inner) => inner.body(),
            other => format!("{} ;", other.body()),
        }
    }
}

/// A whole program.
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzProgram {
    pub statements: Vec<FuzzStatement>,
}

impl FuzzProgram {
    pub fn to_source(&self) -> String {
        self.statements
            .iter()
            .map(FuzzStatement::to_source)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
