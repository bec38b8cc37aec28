//! Parse structure for VQL statements.
//!
//! The parser keeps the shape of the source text: an [`Expression`] is a
//! left operand followed by `(operator, operand)` pairs, in source order.
//! Precedence is not applied here; that is the compiler's job.

use crate::operator::{BooleanOperator, ComparisonOperator};
use crate::types::{FieldPath, Literal};

/// A full `SELECT ... FROM ... [WHERE ...]` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Selected columns, in order.
    pub columns: Vec<FieldPath>,
    /// Name of the source (table or selection) after `FROM`.
    pub source: String,
    /// The WHERE clause, if present.
    pub filter: Option<Expression>,
}

/// `operand (bool_op operand)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub left: Operand,
    pub operations: Vec<Operation>,
}

impl Expression {
    /// Creates an expression made of a single operand.
    pub fn single(left: Operand) -> Self {
        Self {
            left,
            operations: Vec::new(),
        }
    }
}

/// A boolean operator and the operand to its right.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: BooleanOperator,
    pub operand: Operand,
}

/// A condition or a parenthesized sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Condition(ConditionTerm),
    Paren(ParenExpression),
}

/// `'(' expression ')'`
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpression {
    pub expression: Box<Expression>,
}

/// `identifier comp_op (literal | identifier)`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTerm {
    pub field: FieldPath,
    pub operator: ComparisonOperator,
    pub value: TermValue,
}

/// Right-hand side of a condition as written.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    Literal(Literal),
    /// A bare identifier, compared as text.
    Identifier(String),
}

impl TermValue {
    /// Returns the literal this value compares against.
    pub fn into_literal(self) -> Literal {
        match self {
            TermValue::Literal(literal) => literal,
            TermValue::Identifier(name) => Literal::Text(name),
        }
    }
}
