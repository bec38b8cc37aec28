//! Core value types shared by every filter component.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Identifier of a queryable attribute.
///
/// Three shapes are recognised downstream:
/// - bare name: `pos`
/// - group-scoped name: `ann.gene`
/// - instance-scoped name: `samples.boby.gt`, where the instance part may be
///   one of the wildcards [`FieldPath::ANY_INSTANCE`] or [`FieldPath::ALL_INSTANCES`]
///
/// The path itself carries no behavior; resolution is done by the predicate
/// generator against a field catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Wildcard instance name matching when any instance satisfies the condition.
    pub const ANY_INSTANCE: &'static str = "$any";

    /// Wildcard instance name matching when every instance satisfies the condition.
    pub const ALL_INSTANCES: &'static str = "$all";

    /// Creates a field path from its textual form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the textual form of the path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// A literal value on the right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// The SQL `NULL`; equality against it becomes `IS NULL`.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A literal list, used by the membership operators.
    List(Vec<Literal>),
    /// A reference to a named word set, written `WORDSET['name']`.
    ///
    /// Stands for the set of words stored under that name and is resolved
    /// by the database, not by the engine.
    Wordset(String),
}

/// Key of the object form of [`Literal::Wordset`] in mappings.
pub const WORDSET_KEY: &str = "$wordset";

impl Literal {
    /// Returns true for [`Literal::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Converts the literal to its JSON form in the canonical mapping.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Number((*i).into()),
            Literal::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Literal::Text(s) => Value::String(s.clone()),
            Literal::List(items) => Value::Array(items.iter().map(Literal::to_json).collect()),
            Literal::Wordset(name) => {
                let mut object = serde_json::Map::new();
                object.insert(WORDSET_KEY.to_string(), Value::String(name.clone()));
                Value::Object(object)
            }
        }
    }

    /// Reads a literal from its JSON form.
    ///
    /// The only object accepted is `{"$wordset": "<name>"}`; any other
    /// object, at any nesting depth, yields `None`.
    pub fn from_json(value: &Value) -> Option<Literal> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Literal::Int(i)),
                None => n.as_f64().map(Literal::Float),
            },
            Value::String(s) => Some(Literal::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Literal::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Literal::List),
            Value::Object(object) if object.len() == 1 => object
                .get(WORDSET_KEY)
                .and_then(Value::as_str)
                .map(|name| Literal::Wordset(name.to_string())),
            Value::Object(_) => None,
        }
    }
}

/// Formats the literal the way the DSL writes it.
///
/// Text is always quoted so that the output reads back as text.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Bool(true) => f.write_str("TRUE"),
            Literal::Bool(false) => f.write_str("FALSE"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Text(s) => write_quoted(f, s),
            Literal::Wordset(name) => {
                f.write_str("WORDSET[")?;
                write_quoted(f, name)?;
                f.write_str("]")
            }
            Literal::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("'")
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

impl From<Vec<Literal>> for Literal {
    fn from(items: Vec<Literal>) -> Self {
        Literal::List(items)
    }
}
