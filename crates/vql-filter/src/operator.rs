//! Operator vocabularies.
//!
//! Every operator has three spellings that are kept in bijection:
//!
//! | canonical key | DSL lexeme | predicate token |
//! |---------------|------------|-----------------|
//! | `$eq`         | `=`        | `=`             |
//! | `$ne`         | `!=`       | `!=`            |
//! | `$gt`         | `>`        | `>`             |
//! | `$gte`        | `>=`       | `>=`            |
//! | `$lt`         | `<`        | `<`             |
//! | `$lte`        | `<=`       | `<=`            |
//! | `$in`         | `IN`       | `IN`            |
//! | `$nin`        | `NOT IN`   | `NOT IN`        |
//! | `$regex`      | `=~`       | `REGEXP`        |
//! | `$nregex`     | `!~`       | `NOT REGEXP`    |
//! | `$like`       | `LIKE`     | `LIKE`          |
//! | `$has`        | `HAS`      | `HAS`           |
//! | `$nhas`       | `!HAS`     | `NOT HAS`       |
//! | `$and`        | `AND`      | `AND`           |
//! | `$or`         | `OR`       | `OR`            |
//! | `$xor`        | `XOR`      | `XOR`           |
//!
//! The DSL additionally accepts the aliases `==`, `=/=`, `!IN` and `NOT HAS`.
//!
//! `HAS` tests membership in a separator-joined list column; the predicate
//! token is nominal and the generator rewrites it into a `LIKE`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precedence shared by every comparison operator; binds tighter than any
/// boolean operator.
pub const COMPARISON_PRECEDENCE: u8 = 4;

/// Comparison between a field and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "$eq")]
    Equal,
    #[serde(rename = "$ne")]
    NotEqual,
    #[serde(rename = "$gt")]
    Greater,
    #[serde(rename = "$gte")]
    GreaterOrEqual,
    #[serde(rename = "$lt")]
    Less,
    #[serde(rename = "$lte")]
    LessOrEqual,
    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$nin")]
    NotIn,
    #[serde(rename = "$regex")]
    Regex,
    #[serde(rename = "$nregex")]
    NotRegex,
    #[serde(rename = "$like")]
    Like,
    #[serde(rename = "$has")]
    Has,
    #[serde(rename = "$nhas")]
    NotHas,
}

impl ComparisonOperator {
    /// Every comparison operator, in table order.
    pub const ALL: [ComparisonOperator; 13] = [
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::Greater,
        ComparisonOperator::GreaterOrEqual,
        ComparisonOperator::Less,
        ComparisonOperator::LessOrEqual,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
        ComparisonOperator::Regex,
        ComparisonOperator::NotRegex,
        ComparisonOperator::Like,
        ComparisonOperator::Has,
        ComparisonOperator::NotHas,
    ];

    /// Returns the canonical key used in persisted mappings.
    pub fn key(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "$eq",
            ComparisonOperator::NotEqual => "$ne",
            ComparisonOperator::Greater => "$gt",
            ComparisonOperator::GreaterOrEqual => "$gte",
            ComparisonOperator::Less => "$lt",
            ComparisonOperator::LessOrEqual => "$lte",
            ComparisonOperator::In => "$in",
            ComparisonOperator::NotIn => "$nin",
            ComparisonOperator::Regex => "$regex",
            ComparisonOperator::NotRegex => "$nregex",
            ComparisonOperator::Like => "$like",
            ComparisonOperator::Has => "$has",
            ComparisonOperator::NotHas => "$nhas",
        }
    }

    /// Looks up an operator by canonical key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }

    /// Returns the token emitted into predicate text.
    pub fn predicate_token(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::In => "IN",
            ComparisonOperator::NotIn => "NOT IN",
            ComparisonOperator::Regex => "REGEXP",
            ComparisonOperator::NotRegex => "NOT REGEXP",
            ComparisonOperator::Like => "LIKE",
            ComparisonOperator::Has => "HAS",
            ComparisonOperator::NotHas => "NOT HAS",
        }
    }

    /// Returns the canonical DSL spelling.
    pub fn lexeme(self) -> &'static str {
        match self {
            ComparisonOperator::Regex => "=~",
            ComparisonOperator::NotRegex => "!~",
            ComparisonOperator::NotHas => "!HAS",
            other => other.predicate_token(),
        }
    }

    /// Looks up an operator by DSL spelling, including the `==`, `=/=`,
    /// `!IN` and `NOT HAS` aliases. Word operators are matched
    /// case-insensitively.
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "==" => return Some(ComparisonOperator::Equal),
            "=/=" => return Some(ComparisonOperator::NotEqual),
            _ => {}
        }
        let upper = lexeme.to_ascii_uppercase();
        let normalized = upper.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "!IN" => Some(ComparisonOperator::NotIn),
            "NOT HAS" => Some(ComparisonOperator::NotHas),
            _ => Self::ALL.into_iter().find(|op| op.lexeme() == normalized),
        }
    }

    /// Returns true for `$in` and `$nin`, whose value is a literal list.
    pub fn is_membership(self) -> bool {
        matches!(self, ComparisonOperator::In | ComparisonOperator::NotIn)
    }

    /// Returns true for `$has` and `$nhas`, which look for one item of a
    /// separator-joined list column.
    pub fn is_list_search(self) -> bool {
        matches!(self, ComparisonOperator::Has | ComparisonOperator::NotHas)
    }

    /// Returns the precedence rank used by the expression compiler.
    pub fn precedence(self) -> u8 {
        COMPARISON_PRECEDENCE
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

/// Boolean connective of a logic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperator {
    #[serde(rename = "$and")]
    And,
    #[serde(rename = "$or")]
    Or,
    #[serde(rename = "$xor")]
    Xor,
}

impl BooleanOperator {
    /// Every boolean operator, loosest binding first.
    pub const ALL: [BooleanOperator; 3] =
        [BooleanOperator::Or, BooleanOperator::And, BooleanOperator::Xor];

    /// Returns the canonical key used in persisted mappings.
    pub fn key(self) -> &'static str {
        match self {
            BooleanOperator::And => "$and",
            BooleanOperator::Or => "$or",
            BooleanOperator::Xor => "$xor",
        }
    }

    /// Looks up an operator by canonical key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }

    /// Returns the token emitted into predicate text (also the DSL lexeme).
    pub fn predicate_token(self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
            BooleanOperator::Xor => "XOR",
        }
    }

    /// Looks up an operator by DSL keyword, case-insensitively.
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.predicate_token().eq_ignore_ascii_case(lexeme))
    }

    /// Returns the precedence rank: OR=1, AND=2, XOR=3.
    ///
    /// Lower ranks bind looser.
    pub fn precedence(self) -> u8 {
        match self {
            BooleanOperator::Or => 1,
            BooleanOperator::And => 2,
            BooleanOperator::Xor => 3,
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.predicate_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_vocabularies_are_bijective() {
        for op in ComparisonOperator::ALL {
            assert_eq!(ComparisonOperator::from_key(op.key()), Some(op));
            assert_eq!(ComparisonOperator::from_lexeme(op.lexeme()), Some(op));
        }
        let keys: std::collections::HashSet<_> =
            ComparisonOperator::ALL.iter().map(|op| op.key()).collect();
        assert_eq!(keys.len(), ComparisonOperator::ALL.len());
        let tokens: std::collections::HashSet<_> = ComparisonOperator::ALL
            .iter()
            .map(|op| op.predicate_token())
            .collect();
        assert_eq!(tokens.len(), ComparisonOperator::ALL.len());
    }

    #[test]
    fn test_comparison_aliases() {
        assert_eq!(
            ComparisonOperator::from_lexeme("=="),
            Some(ComparisonOperator::Equal)
        );
        assert_eq!(
            ComparisonOperator::from_lexeme("=/="),
            Some(ComparisonOperator::NotEqual)
        );
        assert_eq!(
            ComparisonOperator::from_lexeme("not   in"),
            Some(ComparisonOperator::NotIn)
        );
        assert_eq!(
            ComparisonOperator::from_lexeme("!in"),
            Some(ComparisonOperator::NotIn)
        );
        assert_eq!(
            ComparisonOperator::from_lexeme("not has"),
            Some(ComparisonOperator::NotHas)
        );
        assert_eq!(
            ComparisonOperator::from_lexeme("has"),
            Some(ComparisonOperator::Has)
        );
        assert_eq!(ComparisonOperator::from_lexeme("~~"), None);
    }

    #[test]
    fn test_boolean_precedence_order() {
        assert!(BooleanOperator::Or.precedence() < BooleanOperator::And.precedence());
        assert!(BooleanOperator::And.precedence() < BooleanOperator::Xor.precedence());
        assert!(BooleanOperator::Xor.precedence() < COMPARISON_PRECEDENCE);
    }

    #[test]
    fn test_boolean_keys() {
        assert_eq!(BooleanOperator::from_key("$and"), Some(BooleanOperator::And));
        assert_eq!(BooleanOperator::from_key("$or"), Some(BooleanOperator::Or));
        assert_eq!(BooleanOperator::from_key("$xor"), Some(BooleanOperator::Xor));
        assert_eq!(BooleanOperator::from_key("$nand"), None);
        assert_eq!(BooleanOperator::from_lexeme("or"), Some(BooleanOperator::Or));
    }

    #[test]
    fn test_operators_serialize_as_keys() {
        assert_eq!(
            serde_json::to_string(&ComparisonOperator::GreaterOrEqual).unwrap(),
            "\"$gte\""
        );
        assert_eq!(
            serde_json::from_str::<BooleanOperator>("\"$or\"").unwrap(),
            BooleanOperator::Or
        );
    }
}
