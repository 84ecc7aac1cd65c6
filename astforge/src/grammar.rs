//! Grammar description.
//!
//! A grammar names the instructions a program may contain and the expression
//! forms their operands may take. It is loaded once, validated, and then only
//! read. Each rule may declare a token alias (`let`, `+`) that selects it in
//! input as well as its name.
//!
//! ```yaml
//! terminator: ";"
//! instructions:
//!   - name: Assignment
//!     token: let
//!     operands: [assignment]
//! expressions:
//!   - name: Addition
//!     token: "+"
//!     kind: arithmetic
//!     operator: add
//!   - name: ParentPid
//!     token: PPID
//!     kind: ppid
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{BinaryOperator, Expression, Leaf};
use crate::lexer::{Token, TokenKind};

/// Errors raised while loading or validating a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("failed to read grammar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML grammar: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML grammar: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported grammar file extension: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("grammar defines no instructions")]
    NoInstructions,

    #[error("duplicate {table} `{name}`")]
    Duplicate { table: &'static str, name: String },

    #[error("invalid token `{token}` for `{rule}`: {reason}")]
    InvalidToken {
        rule: String,
        token: String,
        reason: &'static str,
    },
}

/// Expression kinds an instruction operand slot admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandKind {
    Any,
    Arithmetic,
    /// Read as `target value` directly after the instruction token.
    Assignment,
    Ppid,
    Literal,
    Variable,
}

impl OperandKind {
    /// Whether `expression` may fill a slot of this kind.
    pub fn admits(self, expression: &Expression) -> bool {
        match (self, expression) {
            (OperandKind::Any, _) => true,
            (OperandKind::Arithmetic, Expression::Arithmetic { .. }) => true,
            (OperandKind::Assignment, Expression::Assignment { .. }) => true,
            (OperandKind::Ppid, Expression::Ppid(_)) => true,
            (OperandKind::Literal, Expression::Leaf(Leaf::Integer { .. })) => true,
            (OperandKind::Variable, Expression::Leaf(Leaf::Variable(_))) => true,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OperandKind::Any => "any",
            OperandKind::Arithmetic => "arithmetic",
            OperandKind::Assignment => "assignment",
            OperandKind::Ppid => "ppid",
            OperandKind::Literal => "literal",
            OperandKind::Variable => "variable",
        }
    }
}

/// A statement-level operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub operands: Vec<OperandKind>,
}

/// The shape an expression rule builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionForm {
    Arithmetic { operator: BinaryOperator },
    Assignment,
    Ppid,
}

/// A value-level operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub form: ExpressionForm,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GrammarFile {
    #[serde(default)]
    terminator: Option<String>,
    #[serde(default)]
    instructions: Vec<InstructionRule>,
    #[serde(default)]
    expressions: Vec<ExpressionRule>,
}

/// Validated, read-only grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminator: Option<String>,
    instructions: IndexMap<String, InstructionRule>,
    expressions: IndexMap<String, ExpressionRule>,
    /// Name or alias → index into `instructions`.
    instruction_lookup: FxHashMap<String, usize>,
    /// Name or alias → index into `expressions`.
    expression_lookup: FxHashMap<String, usize>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_yaml::from_str(source)?;
        Self::from_file(file)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = toml::from_str(source)?;
        Self::from_file(file)
    }

    /// Load a grammar file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, GrammarError> {
        let source = fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source),
            Some("toml") => Self::from_toml_str(&source),
            _ => Err(GrammarError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn from_file(file: GrammarFile) -> Result<Self, GrammarError> {
        if file.instructions.is_empty() {
            return Err(GrammarError::NoInstructions);
        }

        if let Some(terminator) = &file.terminator {
            check_token("terminator", terminator)?;
        }

        let mut instructions = IndexMap::new();
        let mut instruction_lookup = FxHashMap::default();
        for rule in file.instructions {
            let index = instructions.len();
            index_rule(
                "instruction",
                &rule.name,
                rule.token.as_deref(),
                index,
                &mut instruction_lookup,
            )?;
            instructions.insert(rule.name.clone(), rule);
        }

        let mut expressions = IndexMap::new();
        let mut expression_lookup = FxHashMap::default();
        for rule in file.expressions {
            let index = expressions.len();
            index_rule(
                "expression",
                &rule.name,
                rule.token.as_deref(),
                index,
                &mut expression_lookup,
            )?;
            if file.terminator.as_deref() == rule.token.as_deref().or(Some(rule.name.as_str())) {
                return Err(GrammarError::InvalidToken {
                    rule: rule.name.clone(),
                    token: file.terminator.clone().unwrap_or_default(),
                    reason: "collides with the statement terminator",
                });
            }
            expressions.insert(rule.name.clone(), rule);
        }

        Ok(Self {
            terminator: file.terminator,
            instructions,
            expressions,
            instruction_lookup,
            expression_lookup,
        })
    }

    /// Look up an instruction by name or token alias.
    pub fn instruction(&self, token: &str) -> Option<&InstructionRule> {
        let index = *self.instruction_lookup.get(token)?;
        self.instructions.get_index(index).map(|(_, rule)| rule)
    }

    /// Look up an expression rule by name or token alias.
    pub fn expression(&self, token: &str) -> Option<&ExpressionRule> {
        let index = *self.expression_lookup.get(token)?;
        self.expressions.get_index(index).map(|(_, rule)| rule)
    }

    /// True if `token` selects any rule or is the terminator.
    pub fn is_reserved(&self, token: &str) -> bool {
        self.instruction_lookup.contains_key(token)
            || self.expression_lookup.contains_key(token)
            || self.terminator.as_deref() == Some(token)
    }

    pub fn terminator(&self) -> Option<&str> {
        self.terminator.as_deref()
    }

    pub fn instructions(&self) -> impl Iterator<Item = &InstructionRule> {
        self.instructions.values()
    }

    pub fn expressions(&self) -> impl Iterator<Item = &ExpressionRule> {
        self.expressions.values()
    }

    /// Serialize back to YAML, e.g. for `check-grammar` output.
    pub fn to_yaml(&self) -> Result<String, GrammarError> {
        let file = GrammarFile {
            terminator: self.terminator.clone(),
            instructions: self.instructions.values().cloned().collect(),
            expressions: self.expressions.values().cloned().collect(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

fn check_token(rule: &str, token: &str) -> Result<(), GrammarError> {
    let reason = if token.is_empty() {
        Some("empty")
    } else if token.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else if Token::synthesize(token).kind == TokenKind::Integer {
        Some("lexes as an integer literal")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GrammarError::InvalidToken {
            rule: rule.to_string(),
            token: token.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn index_rule(
    table: &'static str,
    name: &str,
    token: Option<&str>,
    index: usize,
    lookup: &mut FxHashMap<String, usize>,
) -> Result<(), GrammarError> {
    check_token(name, name)?;
    if let Some(token) = token {
        check_token(name, token)?;
    }

    for key in std::iter::once(name).chain(token.filter(|t| *t != name)) {
        if lookup.insert(key.to_string(), index).is_some() {
            return Err(GrammarError::Duplicate {
                table,
                name: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Programmatic grammar construction.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    file: GrammarFile,
}

impl GrammarBuilder {
    pub fn terminator(mut self, token: impl Into<String>) -> Self {
        self.file.terminator = Some(token.into());
        self
    }

    pub fn instruction(
        mut self,
        name: impl Into<String>,
        token: Option<&str>,
        operands: impl IntoIterator<Item = OperandKind>,
    ) -> Self {
        self.file.instructions.push(InstructionRule {
            name: name.into(),
            token: token.map(str::to_string),
            operands: operands.into_iter().collect(),
        });
        self
    }

    pub fn expression(
        mut self,
        name: impl Into<String>,
        token: Option<&str>,
        form: ExpressionForm,
    ) -> Self {
        self.file.expressions.push(ExpressionRule {
            name: name.into(),
            token: token.map(str::to_string),
            form,
        });
        self
    }

    pub fn arithmetic(
        self,
        name: impl Into<String>,
        token: &str,
        operator: BinaryOperator,
    ) -> Self {
        self.expression(name, Some(token), ExpressionForm::Arithmetic { operator })
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        Grammar::from_file(self.file)
    }
}
