//! Expression compiler: parse structure to canonical filter tree.
//!
//! Compilation runs in three passes:
//!
//! 1. [`FilterCompiler::expand`] flattens the nested parse structure into an
//!    infix stream where every expression boundary is an explicit
//!    open/close marker.
//! 2. [`FilterCompiler::to_postfix`] applies the shunting-yard algorithm
//!    with the boolean precedence ranks (OR=1, AND=2, XOR=3).
//! 3. [`FilterCompiler::build`] folds the postfix stream into an n-ary tree,
//!    merging chains of the same operator into a single logic node.

use tracing::{debug, trace};

use crate::operator::BooleanOperator;
use crate::tree::{Condition, FilterExpr, FilterTree};
use crate::types::FieldPath;

use super::ast::{Expression, Operand};
use super::error::{SyntaxError, SyntaxResult};
use super::parser::FilterParser;

/// One element of the flattened infix stream.
#[derive(Debug, Clone, PartialEq)]
pub enum InfixToken {
    Condition(Condition),
    Operator(BooleanOperator),
    Open,
    Close,
}

/// One element of the postfix stream. Parentheses never survive conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixToken {
    Condition(Condition),
    Operator(BooleanOperator),
}

/// Operator stack entry used during infix to postfix conversion.
#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Open,
    Operator(BooleanOperator),
}

/// A compiled `SELECT` statement.
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    pub columns: Vec<FieldPath>,
    pub source: String,
    /// The WHERE clause; an empty root when the statement has none.
    pub tree: FilterTree,
}

/// Compiles VQL text into canonical filter trees.
///
/// # Example
///
/// ```
/// use vql_filter::filter::FilterCompiler;
/// use vql_filter::mapping::to_mapping;
/// use serde_json::json;
///
/// let tree = FilterCompiler::compile("a=1 AND b=2 AND c=3").unwrap();
/// let mapping = to_mapping(&tree);
/// assert_eq!(mapping["$and"].as_array().unwrap().len(), 3);
/// ```
pub struct FilterCompiler;

impl FilterCompiler {
    /// Compiles a bare WHERE-clause expression.
    pub fn compile(text: &str) -> SyntaxResult<FilterTree> {
        let expression = FilterParser::parse_where(text)?;
        Self::compile_expression(expression)
    }

    /// Compiles a full statement. A statement without WHERE yields an empty tree.
    pub fn compile_statement(text: &str) -> SyntaxResult<CompiledStatement> {
        let statement = FilterParser::parse_statement(text)?;
        let tree = match statement.filter {
            Some(expression) => Self::compile_expression(expression)?,
            None => FilterTree::new(),
        };
        Ok(CompiledStatement {
            columns: statement.columns,
            source: statement.source,
            tree,
        })
    }

    /// Compiles an already parsed expression.
    pub fn compile_expression(expression: Expression) -> SyntaxResult<FilterTree> {
        let infix = Self::expand(expression);
        let infix_len = infix.len();
        let postfix = Self::to_postfix(infix)?;
        debug!(
            infix_tokens = infix_len,
            postfix_tokens = postfix.len(),
            "Compiled filter expression"
        );
        let root = Self::build(postfix)?;
        Ok(FilterTree::from_expr(root))
    }

    /// Flattens an expression into an infix stream with explicit parenthesis
    /// markers around every expression and every parenthesized operand.
    pub fn expand(expression: Expression) -> Vec<InfixToken> {
        let mut out = Vec::new();
        Self::expand_into(expression, &mut out);
        out
    }

    fn expand_into(expression: Expression, out: &mut Vec<InfixToken>) {
        out.push(InfixToken::Open);
        Self::expand_operand(expression.left, out);
        for operation in expression.operations {
            out.push(InfixToken::Operator(operation.operator));
            Self::expand_operand(operation.operand, out);
        }
        out.push(InfixToken::Close);
    }

    fn expand_operand(operand: Operand, out: &mut Vec<InfixToken>) {
        match operand {
            Operand::Condition(term) => out.push(InfixToken::Condition(Condition {
                field: term.field,
                operator: term.operator,
                value: term.value.into_literal(),
            })),
            Operand::Paren(paren) => {
                out.push(InfixToken::Open);
                Self::expand_into(*paren.expression, out);
                out.push(InfixToken::Close);
            }
        }
    }

    /// Converts an infix stream to postfix.
    ///
    /// An incoming operator first pops every stacked operator that binds at
    /// least as tightly, stopping at an open marker. Equal ranks pop so that
    /// chains stay left-associative.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::UnbalancedParenthesis` if the markers do not pair up.
    pub fn to_postfix(infix: Vec<InfixToken>) -> SyntaxResult<Vec<PostfixToken>> {
        let mut output = Vec::with_capacity(infix.len());
        let mut stack: Vec<StackEntry> = Vec::new();

        for token in infix {
            trace!(?token, "Shunting token");
            match token {
                InfixToken::Condition(condition) => {
                    output.push(PostfixToken::Condition(condition));
                }
                InfixToken::Operator(incoming) => {
                    while let Some(StackEntry::Operator(top)) = stack.last().copied() {
                        if top.precedence() < incoming.precedence() {
                            break;
                        }
                        stack.pop();
                        output.push(PostfixToken::Operator(top));
                    }
                    stack.push(StackEntry::Operator(incoming));
                }
                InfixToken::Open => stack.push(StackEntry::Open),
                InfixToken::Close => loop {
                    match stack.pop() {
                        Some(StackEntry::Open) => break,
                        Some(StackEntry::Operator(op)) => output.push(PostfixToken::Operator(op)),
                        None => return Err(SyntaxError::UnbalancedParenthesis),
                    }
                },
            }
        }

        while let Some(entry) = stack.pop() {
            match entry {
                StackEntry::Operator(op) => output.push(PostfixToken::Operator(op)),
                StackEntry::Open => return Err(SyntaxError::UnbalancedParenthesis),
            }
        }

        Ok(output)
    }

    /// Folds a postfix stream into an n-ary expression.
    ///
    /// When the left operand of an operator is already a logic node with the
    /// same operator, the right operand is appended to it instead of nesting.
    /// A lone condition is wrapped in an `AND` root.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::OperandUnderflow` when an operator finds fewer
    /// than two operands, `SyntaxError::DanglingOperands` when operands are
    /// left unjoined and `SyntaxError::EmptyExpression` for an empty stream.
    pub fn build(postfix: Vec<PostfixToken>) -> SyntaxResult<FilterExpr> {
        let mut stack: Vec<FilterExpr> = Vec::new();

        for token in postfix {
            match token {
                PostfixToken::Condition(condition) => stack.push(FilterExpr::Condition(condition)),
                PostfixToken::Operator(operator) => {
                    let right = stack
                        .pop()
                        .ok_or_else(|| SyntaxError::operand_underflow(operator.to_string()))?;
                    let left = stack
                        .pop()
                        .ok_or_else(|| SyntaxError::operand_underflow(operator.to_string()))?;

                    let merged = match left {
                        FilterExpr::Logic {
                            operator: left_op,
                            mut children,
                        } if left_op == operator => {
                            children.push(right);
                            FilterExpr::Logic {
                                operator,
                                children,
                            }
                        }
                        left => FilterExpr::Logic {
                            operator,
                            children: vec![left, right],
                        },
                    };
                    stack.push(merged);
                }
            }
        }

        if stack.len() > 1 {
            return Err(SyntaxError::DanglingOperands { count: stack.len() });
        }
        match stack.pop() {
            Some(condition @ FilterExpr::Condition(_)) => Ok(FilterExpr::Logic {
                operator: BooleanOperator::And,
                children: vec![condition],
            }),
            Some(logic) => Ok(logic),
            None => Err(SyntaxError::EmptyExpression),
        }
    }
}
