//! Canonical mapping form of a filter tree.
//!
//! The mapping is the persisted and wire form of a tree:
//!
//! ```json
//! {"$and": [
//!     {"field": "chr", "operator": "$eq", "value": "chr1"},
//!     {"$or": [{"field": "ref", "operator": "$eq", "value": "A"}]}
//! ]}
//! ```
//!
//! Node ids and enabled flags are not part of it. Disabled nodes are left
//! out on write and every node reads back enabled.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::operator::{BooleanOperator, ComparisonOperator};
use crate::tree::{Condition, FilterExpr, FilterTree, NodeId, StructuralError};
use crate::types::{FieldPath, Literal};

const FIELD_KEY: &str = "field";
const OPERATOR_KEY: &str = "operator";
const VALUE_KEY: &str = "value";

/// Errors raised when reading a mapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A node is not a JSON object.
    #[error("filter mapping nodes must be objects")]
    NotAnObject,

    /// A `$`-prefixed key that names no operator.
    #[error("unknown operator '{key}'")]
    UnknownOperator { key: String },

    /// An object that is neither a logic node nor a condition.
    #[error("invalid filter mapping: {detail}")]
    InvalidShape { detail: String },

    /// A condition value with no literal counterpart.
    #[error("invalid condition value: {detail}")]
    InvalidValue { detail: String },
}

impl MappingError {
    fn shape(detail: impl Into<String>) -> Self {
        MappingError::InvalidShape {
            detail: detail.into(),
        }
    }
}

/// Serializes a tree.
///
/// An empty root, or a disabled one, serializes as `{}`.
pub fn to_mapping(tree: &FilterTree) -> Value {
    if tree.is_empty() {
        return Value::Object(Map::new());
    }
    match tree.enabled_expr() {
        Some(expr) => expr_to_mapping(&expr),
        None => Value::Object(Map::new()),
    }
}

/// Serializes the subtree rooted at `id`.
///
/// The flag of `id` itself is ignored; disabled descendants are left out.
pub fn subtree_mapping(tree: &FilterTree, id: NodeId) -> Result<Value, StructuralError> {
    tree.enabled_subtree(id)
        .map(|expr| expr_to_mapping(&expr))
        .ok_or(StructuralError::UnknownNode { id })
}

/// Serializes an expression.
pub fn expr_to_mapping(expr: &FilterExpr) -> Value {
    let mut object = Map::new();
    match expr {
        FilterExpr::Logic { operator, children } => {
            object.insert(
                operator.key().to_string(),
                Value::Array(children.iter().map(expr_to_mapping).collect()),
            );
        }
        FilterExpr::Condition(condition) => {
            object.insert(
                FIELD_KEY.to_string(),
                Value::String(condition.field.to_string()),
            );
            object.insert(
                OPERATOR_KEY.to_string(),
                Value::String(condition.operator.key().to_string()),
            );
            object.insert(VALUE_KEY.to_string(), condition.value.to_json());
        }
    }
    Value::Object(object)
}

/// Reads a tree. Every node gets a fresh id and is enabled.
///
/// `{}` reads as an empty tree and a top-level condition is wrapped in an
/// `$and` root.
pub fn from_mapping(value: &Value) -> Result<FilterTree, MappingError> {
    let expr = expr_from_mapping(value)?;
    let tree = FilterTree::from_expr(expr);
    debug!(nodes = tree.len(), "Loaded filter tree from mapping");
    Ok(tree)
}

/// Reads one mapping node into an expression.
///
/// Besides the canonical forms this accepts the shorthand conditions
/// `{"<field>": <value>}` (equality) and `{"<field>": {"<op-key>": <value>}}`.
pub fn expr_from_mapping(value: &Value) -> Result<FilterExpr, MappingError> {
    let object = value.as_object().ok_or(MappingError::NotAnObject)?;

    if object.is_empty() {
        return Ok(FilterExpr::and(Vec::new()));
    }
    if object.contains_key(FIELD_KEY) {
        return canonical_condition(object).map(FilterExpr::Condition);
    }
    if object.len() != 1 {
        return Err(MappingError::shape(format!(
            "expected a single operator or field key, found {} keys",
            object.len()
        )));
    }

    let Some((key, inner)) = object.iter().next() else {
        return Err(MappingError::shape("empty object"));
    };

    if key.starts_with('$') {
        let operator = BooleanOperator::from_key(key)
            .ok_or_else(|| MappingError::UnknownOperator { key: key.clone() })?;
        let items = inner.as_array().ok_or_else(|| {
            MappingError::shape(format!("'{key}' must map to a list of nodes"))
        })?;
        let children = items
            .iter()
            .map(expr_from_mapping)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FilterExpr::Logic { operator, children });
    }

    shorthand_condition(key, inner).map(FilterExpr::Condition)
}

fn canonical_condition(object: &Map<String, Value>) -> Result<Condition, MappingError> {
    if let Some(extra) = object
        .keys()
        .find(|k| ![FIELD_KEY, OPERATOR_KEY, VALUE_KEY].contains(&k.as_str()))
    {
        return Err(MappingError::shape(format!(
            "unexpected key '{extra}' in condition"
        )));
    }

    let field = object
        .get(FIELD_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| MappingError::shape("condition field must be a string"))?;

    let operator = match object.get(OPERATOR_KEY) {
        None => ComparisonOperator::Equal,
        Some(Value::String(key)) => comparison_from_key(key)?,
        Some(_) => return Err(MappingError::shape("condition operator must be a string")),
    };

    let value = literal(object.get(VALUE_KEY).unwrap_or(&Value::Null))?;

    Ok(Condition {
        field: FieldPath::new(field),
        operator,
        value,
    })
}

fn shorthand_condition(field: &str, inner: &Value) -> Result<Condition, MappingError> {
    let (operator, value) = match inner {
        Value::Object(object) if object.len() == 1 => {
            let Some((key, value)) = object.iter().next() else {
                return Err(MappingError::shape("empty operator object"));
            };
            (comparison_from_key(key)?, literal(value)?)
        }
        Value::Object(_) => {
            return Err(MappingError::shape(format!(
                "condition on '{field}' must have exactly one operator"
            )))
        }
        other => (ComparisonOperator::Equal, literal(other)?),
    };
    Ok(Condition {
        field: FieldPath::new(field),
        operator,
        value,
    })
}

fn comparison_from_key(key: &str) -> Result<ComparisonOperator, MappingError> {
    ComparisonOperator::from_key(key).ok_or_else(|| MappingError::UnknownOperator {
        key: key.to_string(),
    })
}

fn literal(value: &Value) -> Result<Literal, MappingError> {
    Literal::from_json(value).ok_or_else(|| MappingError::InvalidValue {
        detail: value.to_string(),
    })
}

impl Serialize for FilterTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_mapping(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_mapping(&value).map_err(D::Error::custom)
    }
}
