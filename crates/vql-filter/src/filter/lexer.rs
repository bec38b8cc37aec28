//! Lexer (tokenizer) for VQL statements and WHERE clauses.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::operator::ComparisonOperator;

use super::error::SyntaxError;

/// Result of tokenizing an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerResult {
    /// The tokens successfully read, with their positions.
    pub tokens: Vec<PositionedToken>,
    /// Errors for input that starts no token.
    pub errors: Vec<SyntaxError>,
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token of the VQL language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ==================== Atoms ====================
    /// A dotted identifier (`pos`, `ann.gene`, `samples.boby.gt`).
    Identifier(String),

    /// An integer literal.
    Integer(i64),

    /// A floating point literal.
    Float(f64),

    /// A quoted string literal, unescaped.
    Str(String),

    // ==================== Keywords ====================
    Select,
    From,
    Where,
    And,
    Or,
    Xor,
    Not,
    In,
    Like,
    Has,
    Wordset,
    Null,
    True,
    False,

    // ==================== Symbols ====================
    /// A symbolic comparison operator (`=`, `==`, `!=`, `=/=`, `>`, `>=`,
    /// `<`, `<=`, `=~`, `!~`, `!IN`, `!HAS`).
    Comparison(ComparisonOperator),

    /// `,`
    Comma,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `[`
    OpenBracket,

    /// `]`
    CloseBracket,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => f.write_str(name),
            Token::Integer(i) => write!(f, "{i}"),
            Token::Float(x) => write!(f, "{x:?}"),
            Token::Str(s) => write!(f, "'{s}'"),
            Token::Select => f.write_str("SELECT"),
            Token::From => f.write_str("FROM"),
            Token::Where => f.write_str("WHERE"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Xor => f.write_str("XOR"),
            Token::Not => f.write_str("NOT"),
            Token::In => f.write_str("IN"),
            Token::Like => f.write_str("LIKE"),
            Token::Has => f.write_str("HAS"),
            Token::Wordset => f.write_str("WORDSET"),
            Token::Null => f.write_str("NULL"),
            Token::True => f.write_str("TRUE"),
            Token::False => f.write_str("FALSE"),
            Token::Comparison(op) => f.write_str(op.lexeme()),
            Token::Comma => f.write_str(","),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::OpenBracket => f.write_str("["),
            Token::CloseBracket => f.write_str("]"),
        }
    }
}

/// Lexer for tokenizing VQL text.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
    /// Errors encountered during tokenization.
    errors: Vec<SyntaxError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Consumes the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(&expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads a dotted identifier.
    ///
    /// `$`, `*` and `?` are allowed so that wildcard instance names such as
    /// `samples.$any.gt`, `samples.*.gt` or `samples.?.gt` read as a single
    /// path.
    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '*' | '?') {
                ident.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        ident
    }

    /// Reads a quoted string (single or double quotes) with backslash escapes.
    fn read_quoted_string(&mut self, quote_char: char, start: usize) -> Option<String> {
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        while let Some(c) = self.next_char() {
            if c == quote_char {
                return Some(result);
            }
            if c == '\\' {
                if let Some(escaped) = self.next_char() {
                    result.push(escaped);
                }
            } else {
                result.push(c);
            }
        }

        self.errors.push(SyntaxError::UnterminatedString {
            fragment: format!("{quote_char}{result}"),
            position: start,
        });
        None
    }

    /// Reads an integer or float literal, including a leading minus sign.
    fn read_number(&mut self, start: usize) -> Option<Token> {
        let mut text = String::new();
        if self.eat('-') {
            text.push('-');
        }
        self.push_digits(&mut text);

        let mut is_float = false;
        if self.peek() == Some(&'.') {
            is_float = true;
            text.push('.');
            self.next_char();
            self.push_digits(&mut text);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            text.push('e');
            self.next_char();
            if let Some(&sign) = self.peek() {
                if sign == '+' || sign == '-' {
                    text.push(sign);
                    self.next_char();
                }
            }
            self.push_digits(&mut text);
        }

        let parsed = if is_float {
            text.parse::<f64>().ok().map(Token::Float)
        } else {
            text.parse::<i64>().ok().map(Token::Integer)
        };
        if parsed.is_none() {
            self.errors.push(SyntaxError::InvalidNumber {
                fragment: text,
                position: start,
            });
        }
        parsed
    }

    fn push_digits(&mut self, text: &mut String) {
        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Records an unexpected character and moves past it.
    fn reject(&mut self, character: char, position: usize) {
        self.errors.push(SyntaxError::UnexpectedCharacter {
            character,
            position,
        });
    }

    /// Returns the next token with its position, or None if at end of input.
    pub fn next_token(&mut self) -> Option<PositionedToken> {
        loop {
            self.skip_whitespace();

            let c = *self.peek()?;
            let start = self.position;

            let token = match c {
                '(' => {
                    self.next_char();
                    Some(Token::OpenParen)
                }
                ')' => {
                    self.next_char();
                    Some(Token::CloseParen)
                }
                ',' => {
                    self.next_char();
                    Some(Token::Comma)
                }
                '[' => {
                    self.next_char();
                    Some(Token::OpenBracket)
                }
                ']' => {
                    self.next_char();
                    Some(Token::CloseBracket)
                }
                '=' => {
                    self.next_char();
                    if self.eat('=') {
                        Some(Token::Comparison(ComparisonOperator::Equal))
                    } else if self.eat('~') {
                        Some(Token::Comparison(ComparisonOperator::Regex))
                    } else if self.eat('/') {
                        if self.eat('=') {
                            Some(Token::Comparison(ComparisonOperator::NotEqual))
                        } else {
                            self.reject('/', start + 1);
                            None
                        }
                    } else {
                        Some(Token::Comparison(ComparisonOperator::Equal))
                    }
                }
                '!' => {
                    self.next_char();
                    if self.eat('=') {
                        Some(Token::Comparison(ComparisonOperator::NotEqual))
                    } else if self.eat('~') {
                        Some(Token::Comparison(ComparisonOperator::NotRegex))
                    } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
                        let word = self.read_identifier();
                        match word.to_ascii_uppercase().as_str() {
                            "IN" => Some(Token::Comparison(ComparisonOperator::NotIn)),
                            "HAS" => Some(Token::Comparison(ComparisonOperator::NotHas)),
                            _ => {
                                self.reject('!', start);
                                None
                            }
                        }
                    } else {
                        self.reject('!', start);
                        None
                    }
                }
                '>' => {
                    self.next_char();
                    if self.eat('=') {
                        Some(Token::Comparison(ComparisonOperator::GreaterOrEqual))
                    } else {
                        Some(Token::Comparison(ComparisonOperator::Greater))
                    }
                }
                '<' => {
                    self.next_char();
                    if self.eat('=') {
                        Some(Token::Comparison(ComparisonOperator::LessOrEqual))
                    } else {
                        Some(Token::Comparison(ComparisonOperator::Less))
                    }
                }
                '\'' | '"' => self.read_quoted_string(c, start).map(Token::Str),
                '-' => {
                    if self.chars.clone().nth(1).is_some_and(|d| d.is_ascii_digit()) {
                        self.read_number(start)
                    } else {
                        self.next_char();
                        self.reject('-', start);
                        None
                    }
                }
                _ if c.is_ascii_digit() => self.read_number(start),
                _ if c.is_alphabetic() || c == '_' || c == '$' => {
                    let ident = self.read_identifier();
                    Some(Self::keyword(&ident).unwrap_or(Token::Identifier(ident)))
                }
                _ => {
                    self.next_char();
                    self.reject(c, start);
                    None
                }
            };

            if let Some(token) = token {
                return Some(PositionedToken {
                    token,
                    position: start,
                });
            }
        }
    }

    /// Maps a word to its keyword token, case-insensitively.
    fn keyword(word: &str) -> Option<Token> {
        let token = match word.to_ascii_uppercase().as_str() {
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "AND" => Token::And,
            "OR" => Token::Or,
            "XOR" => Token::Xor,
            "NOT" => Token::Not,
            "IN" => Token::In,
            "LIKE" => Token::Like,
            "HAS" => Token::Has,
            "WORDSET" => Token::Wordset,
            "NULL" => Token::Null,
            "TRUE" => Token::True,
            "FALSE" => Token::False,
            _ => return None,
        };
        Some(token)
    }

    /// Collects all tokens into a vector (without positions).
    #[cfg(test)]
    pub fn tokenize(self) -> Vec<Token> {
        self.tokenize_with_errors()
            .tokens
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    /// Collects all tokens and any errors encountered.
    pub fn tokenize_with_errors(mut self) -> LexerResult {
        let mut tokens = Vec::new();
        while let Some(positioned_token) = self.next_token() {
            tokens.push(positioned_token);
        }
        LexerResult {
            tokens,
            errors: self.errors,
        }
    }
}
