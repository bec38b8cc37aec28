//! VQL lexer, parser and expression compiler.
//!
//! This module turns query text into a [`FilterTree`](crate::tree::FilterTree).
//!
//! # Supported Syntax
//!
//! ## Statements
//! - `SELECT chr, pos FROM variants WHERE <expression>`
//!
//! ## Conditions
//! - `field = value`, `==`, `!=`, `=/=`, `>`, `>=`, `<`, `<=`
//! - `field =~ 'pattern'`, `field !~ 'pattern'`, `field LIKE 'pattern'`
//! - `field IN (1, 2)`, `field NOT IN ('a', 'b')`
//!
//! Values are integers, floats, quoted strings, `NULL`, `TRUE` and `FALSE`.
//! A bare identifier on the right-hand side is compared as text.
//!
//! ## Field Paths
//! - `pos` - plain field
//! - `ann.gene` - group-scoped field
//! - `samples.boby.gt` - instance-scoped field; `ANY` / `*` and `ALL` name
//!   every instance
//!
//! ## Boolean Operators
//! - `OR` (loosest), `AND`, `XOR` (tightest)
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use vql_filter::filter::FilterCompiler;
//! use vql_filter::operator::BooleanOperator;
//!
//! let tree = FilterCompiler::compile("a=1 OR b=2 AND c=3").unwrap();
//! assert_eq!(tree.root_node().logic_operator(), Some(BooleanOperator::Or));
//! ```

mod ast;
mod compiler;
mod error;
mod lexer;
mod parser;
mod render;

pub use ast::{
    ConditionTerm, Expression, Operand, Operation, ParenExpression, Statement, TermValue,
};
pub use compiler::{CompiledStatement, FilterCompiler, InfixToken, PostfixToken};
pub use error::{SyntaxError, SyntaxResult};
pub use lexer::{Lexer, LexerResult, PositionedToken, Token};
pub use parser::FilterParser;
pub use render::to_vql;
