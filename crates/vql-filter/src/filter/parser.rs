//! Recursive descent parser for VQL statements and WHERE clauses.

use crate::operator::{BooleanOperator, ComparisonOperator};
use crate::types::{FieldPath, Literal};

use super::ast::{
    ConditionTerm, Expression, Operand, Operation, ParenExpression, Statement, TermValue,
};
use super::error::{SyntaxError, SyntaxResult};
use super::lexer::{Lexer, PositionedToken, Token};

/// Parser for VQL text.
///
/// # Grammar
///
/// ```text
/// statement  ::= "SELECT" column ("," column)* "FROM" identifier ["WHERE" expression]
/// expression ::= operand (bool_op operand)*
/// operand    ::= condition | "(" expression ")"
/// condition  ::= identifier comp_op (literal | identifier)
///              | identifier ("IN" | "NOT" "IN" | "!IN") (literal | "(" literal ("," literal)* ")")
/// bool_op    ::= "AND" | "OR" | "XOR"
/// comp_op    ::= "=" | "==" | "!=" | "=/=" | ">" | "<" | ">=" | "<=" | "=~" | "!~" | "LIKE"
///              | "HAS" | "NOT" "HAS" | "!HAS"
/// literal    ::= integer | float | string | "NULL" | "TRUE" | "FALSE" | wordset
/// wordset    ::= "WORDSET" "[" string "]"
/// ```
///
/// Boolean operators are kept in source order; no precedence is applied.
///
/// # Example
///
/// ```
/// use vql_filter::filter::FilterParser;
///
/// let expression = FilterParser::parse_where("pos > 100 AND chr = 'chr1'").unwrap();
/// assert_eq!(expression.operations.len(), 1);
/// ```
pub struct FilterParser {
    tokens: Vec<PositionedToken>,
    position: usize,
}

impl FilterParser {
    /// Parses a full `SELECT` statement.
    ///
    /// # Errors
    ///
    /// Returns the first lexer error if the text does not tokenize, or a
    /// `SyntaxError` describing the first token that breaks the grammar.
    pub fn parse_statement(input: &str) -> SyntaxResult<Statement> {
        let mut parser = Self::from_text(input)?;
        let statement = parser.statement()?;
        parser.expect_end()?;
        Ok(statement)
    }

    /// Parses a bare WHERE-clause expression.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::EmptyExpression` if the input is empty or
    /// whitespace, otherwise the same errors as [`FilterParser::parse_statement`].
    pub fn parse_where(input: &str) -> SyntaxResult<Expression> {
        let mut parser = Self::from_text(input)?;
        let expression = parser.expression()?;
        parser.expect_end()?;
        Ok(expression)
    }

    fn from_text(input: &str) -> SyntaxResult<Self> {
        if input.trim().is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }

        let result = Lexer::new(input).tokenize_with_errors();
        if let Some(error) = result.errors.into_iter().next() {
            return Err(error);
        }
        if result.tokens.is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }

        Ok(Self {
            tokens: result.tokens,
            position: 0,
        })
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|pt| &pt.token)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    /// Error for the current token, or end of input.
    fn unexpected(&self) -> SyntaxError {
        match self.tokens.get(self.position) {
            Some(pt) => SyntaxError::unexpected_token(pt.token.to_string(), pt.position),
            None => SyntaxError::UnexpectedEndOfInput,
        }
    }

    fn expect(&mut self, expected: &Token) -> SyntaxResult<()> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_end(&self) -> SyntaxResult<()> {
        match self.tokens.get(self.position) {
            None => Ok(()),
            Some(pt) => Err(SyntaxError::unexpected_token(
                pt.token.to_string(),
                pt.position,
            )),
        }
    }

    fn statement(&mut self) -> SyntaxResult<Statement> {
        self.expect(&Token::Select)?;

        let mut columns = vec![self.field_path()?];
        while self.check(&Token::Comma) {
            self.advance(); // consume ','
            columns.push(self.field_path()?);
        }

        self.expect(&Token::From)?;
        let source = match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                name
            }
            _ => return Err(self.unexpected()),
        };

        let filter = if self.check(&Token::Where) {
            self.advance(); // consume 'WHERE'
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Statement {
            columns,
            source,
            filter,
        })
    }

    /// Parses `operand (bool_op operand)*`
    fn expression(&mut self) -> SyntaxResult<Expression> {
        let left = self.operand()?;
        let mut operations = Vec::new();

        while let Some(operator) = self.boolean_operator() {
            self.advance(); // consume the operator
            let operand = self.operand()?;
            operations.push(Operation { operator, operand });
        }

        Ok(Expression { left, operations })
    }

    fn boolean_operator(&self) -> Option<BooleanOperator> {
        match self.peek()? {
            Token::And => Some(BooleanOperator::And),
            Token::Or => Some(BooleanOperator::Or),
            Token::Xor => Some(BooleanOperator::Xor),
            _ => None,
        }
    }

    /// Parses a condition or a parenthesized expression.
    fn operand(&mut self) -> SyntaxResult<Operand> {
        match self.peek() {
            Some(Token::OpenParen) => {
                let open = self.advance().map_or(0, |pt| pt.position);
                let expression = self.expression()?;
                if !self.check(&Token::CloseParen) {
                    return match self.peek() {
                        None => Err(SyntaxError::UnclosedParenthesis { position: open }),
                        Some(_) => Err(self.unexpected()),
                    };
                }
                self.advance(); // consume ')'
                Ok(Operand::Paren(ParenExpression {
                    expression: Box::new(expression),
                }))
            }
            Some(Token::Identifier(_)) => Ok(Operand::Condition(self.condition()?)),
            _ => Err(self.unexpected()),
        }
    }

    fn condition(&mut self) -> SyntaxResult<ConditionTerm> {
        let field = self.field_path()?;
        let operator = self.comparison_operator()?;

        let value = if operator.is_membership() {
            TermValue::Literal(self.membership_values()?)
        } else {
            match self.peek() {
                Some(Token::Identifier(name)) => {
                    let name = name.clone();
                    self.advance();
                    TermValue::Identifier(name)
                }
                _ => TermValue::Literal(self.literal()?),
            }
        };

        Ok(ConditionTerm {
            field,
            operator,
            value,
        })
    }

    fn comparison_operator(&mut self) -> SyntaxResult<ComparisonOperator> {
        let operator = match self.peek() {
            Some(Token::Comparison(op)) => *op,
            Some(Token::In) => ComparisonOperator::In,
            Some(Token::Like) => ComparisonOperator::Like,
            Some(Token::Has) => ComparisonOperator::Has,
            Some(Token::Not) => {
                self.advance(); // consume 'NOT'
                match self.peek() {
                    Some(Token::In) => ComparisonOperator::NotIn,
                    Some(Token::Has) => ComparisonOperator::NotHas,
                    _ => return Err(self.unexpected()),
                }
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(operator)
    }

    /// Parses the right-hand side of `IN` / `NOT IN`.
    ///
    /// A single literal is accepted and kept as a one-element list; a word
    /// set reference is kept as is.
    fn membership_values(&mut self) -> SyntaxResult<Literal> {
        if self.check(&Token::Wordset) {
            return self.wordset();
        }
        if !self.check(&Token::OpenParen) {
            return Ok(Literal::List(vec![self.literal()?]));
        }

        let open = self.advance().map_or(0, |pt| pt.position);
        let mut items = vec![self.literal()?];
        while self.check(&Token::Comma) {
            self.advance(); // consume ','
            items.push(self.literal()?);
        }
        match self.peek() {
            Some(Token::CloseParen) => {
                self.advance();
                Ok(Literal::List(items))
            }
            None => Err(SyntaxError::UnclosedParenthesis { position: open }),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn literal(&mut self) -> SyntaxResult<Literal> {
        let literal = match self.peek() {
            Some(Token::Integer(i)) => Literal::Int(*i),
            Some(Token::Float(x)) => Literal::Float(*x),
            Some(Token::Str(s)) => Literal::Text(s.clone()),
            Some(Token::Null) => Literal::Null,
            Some(Token::True) => Literal::Bool(true),
            Some(Token::False) => Literal::Bool(false),
            Some(Token::Wordset) => return self.wordset(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(literal)
    }

    /// Parses `WORDSET['name']`.
    fn wordset(&mut self) -> SyntaxResult<Literal> {
        self.expect(&Token::Wordset)?;
        self.expect(&Token::OpenBracket)?;
        let name = match self.peek() {
            Some(Token::Str(name)) => name.clone(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        self.expect(&Token::CloseBracket)?;
        Ok(Literal::Wordset(name))
    }

    fn field_path(&mut self) -> SyntaxResult<FieldPath> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                let path = normalize_path(name);
                self.advance();
                Ok(path)
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// Rewrites wildcard instance names (`ANY`, `*`, `ALL`, `?`) to their canonical form.
fn normalize_path(name: &str) -> FieldPath {
    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() < 3 {
        return FieldPath::new(name);
    }

    let last = segments.len() - 1;
    let rewritten: Vec<&str> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if i == 0 || i == last {
                *segment
            } else if *segment == "*" || segment.eq_ignore_ascii_case("any") {
                FieldPath::ANY_INSTANCE
            } else if *segment == "?" || segment.eq_ignore_ascii_case("all") {
                FieldPath::ALL_INSTANCES
            } else {
                *segment
            }
        })
        .collect();
    FieldPath::new(rewritten.join("."))
}
