//! Predicate generation from filter trees.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operator::{BooleanOperator, ComparisonOperator};
use crate::tree::{Condition, FilterExpr, FilterTree};
use crate::types::{FieldPath, Literal};

use super::catalog::FieldCatalog;
use super::error::ResolutionError;
use super::resolve::{FieldResolver, Resolution, TableLayout};

/// Separator joining the items of list-valued columns searched by `HAS`.
pub const LIST_SEPARATOR: &str = ",";

/// Characters that make a pattern a real regular expression.
const REGEX_METACHARACTERS: &[char] = &['[', ']', '+', '.', '?', '*', '(', ')', '^', '$'];

/// Knobs of predicate generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    #[serde(flatten)]
    pub layout: TableLayout,
    /// Render `=~` / `!~` on plain patterns as `LIKE '%v%'` / `NOT LIKE '%v%'`.
    pub like_for_plain_patterns: bool,
}

/// A generated predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    /// Predicate text; empty when no condition survives.
    pub text: String,
    /// Concrete field paths the text references.
    pub fields: BTreeSet<FieldPath>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Generates predicates for one catalog snapshot.
///
/// # Example
///
/// ```
/// use vql_filter::filter::FilterCompiler;
/// use vql_filter::predicate::{FieldCategory, FieldType, PredicateGenerator, StaticCatalog};
///
/// let catalog = StaticCatalog::default()
///     .with_field("pos", FieldCategory::Plain, FieldType::Int)
///     .with_field("gene", FieldCategory::Group, FieldType::Str);
/// let tree = FilterCompiler::compile("pos > 100 AND ann.gene = 'GJB2'").unwrap();
/// let predicate = PredicateGenerator::new(&catalog, Default::default())
///     .generate(&tree)
///     .unwrap();
/// assert_eq!(
///     predicate.text,
///     "(`variants`.`pos` > 100 AND `annotations`.`gene` = 'GJB2')"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PredicateGenerator {
    resolver: FieldResolver,
    like_for_plain_patterns: bool,
}

impl PredicateGenerator {
    pub fn new(catalog: &dyn FieldCatalog, options: GeneratorOptions) -> Self {
        Self {
            resolver: FieldResolver::new(catalog, options.layout),
            like_for_plain_patterns: options.like_for_plain_patterns,
        }
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Renders the enabled part of `tree`.
    ///
    /// Disabled nodes are skipped with their whole subtree. A logic node
    /// with no surviving child contributes nothing; one with a single
    /// survivor contributes that child unwrapped; otherwise the children are
    /// joined by the operator inside parentheses.
    ///
    /// # Errors
    ///
    /// Returns the first `ResolutionError` met; nothing is guessed.
    pub fn generate(&self, tree: &FilterTree) -> Result<Predicate, ResolutionError> {
        let mut fields = BTreeSet::new();
        let text = match tree.enabled_expr() {
            Some(expr) => self.render(&expr, &mut fields)?.unwrap_or_default(),
            None => String::new(),
        };
        debug!(
            referenced_fields = fields.len(),
            empty = text.is_empty(),
            "Generated predicate"
        );
        Ok(Predicate { text, fields })
    }

    fn render(
        &self,
        expr: &FilterExpr,
        fields: &mut BTreeSet<FieldPath>,
    ) -> Result<Option<String>, ResolutionError> {
        match expr {
            FilterExpr::Condition(condition) => self.render_condition(condition, fields).map(Some),
            FilterExpr::Logic { operator, children } => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(part) = self.render(child, fields)? {
                        parts.push(part);
                    }
                }
                Ok(join(*operator, parts))
            }
        }
    }

    fn render_condition(
        &self,
        condition: &Condition,
        fields: &mut BTreeSet<FieldPath>,
    ) -> Result<String, ResolutionError> {
        let resolution = self.resolver.resolve(&condition.field)?;
        let parts: Vec<String> = resolution
            .fields()
            .iter()
            .map(|field| {
                fields.insert(field.path.clone());
                self.render_comparison(&field.column, condition.operator, &condition.value)
            })
            .collect();

        let operator = match resolution {
            Resolution::Single(_) => BooleanOperator::And,
            Resolution::Expanded { operator, .. } => operator,
        };
        // Resolution always yields at least one field
        Ok(join(operator, parts).unwrap_or_default())
    }

    fn render_comparison(
        &self,
        column: &str,
        operator: ComparisonOperator,
        value: &Literal,
    ) -> String {
        match (operator, value) {
            (ComparisonOperator::Equal, Literal::Null) => format!("{column} IS NULL"),
            (ComparisonOperator::NotEqual, Literal::Null) => format!("{column} IS NOT NULL"),
            (
                ComparisonOperator::In | ComparisonOperator::NotIn,
                Literal::List(_) | Literal::Wordset(_),
            ) => format!("{column} {} {}", operator.predicate_token(), sql_value(value)),
            (ComparisonOperator::In | ComparisonOperator::NotIn, scalar) => {
                format!("{column} {} ({})", operator.predicate_token(), sql_value(scalar))
            }
            (ComparisonOperator::Regex | ComparisonOperator::NotRegex, Literal::Text(pattern))
                if self.like_for_plain_patterns && !pattern.contains(REGEX_METACHARACTERS) =>
            {
                let like = if operator == ComparisonOperator::Regex {
                    "LIKE"
                } else {
                    "NOT LIKE"
                };
                format!("{column} {like} {}", sql_string(&format!("%{pattern}%")))
            }
            (ComparisonOperator::Has | ComparisonOperator::NotHas, Literal::Wordset(_)) => {
                let membership = if operator == ComparisonOperator::Has {
                    ComparisonOperator::In
                } else {
                    ComparisonOperator::NotIn
                };
                self.render_comparison(column, membership, value)
            }
            (ComparisonOperator::Has | ComparisonOperator::NotHas, item) => {
                let like = if operator == ComparisonOperator::Has {
                    "LIKE"
                } else {
                    "NOT LIKE"
                };
                let item = match item {
                    Literal::Text(text) => text.clone(),
                    other => sql_value(other),
                };
                format!(
                    "'{LIST_SEPARATOR}' || {column} || '{LIST_SEPARATOR}' {like} {}",
                    sql_string(&format!("%{LIST_SEPARATOR}{item}{LIST_SEPARATOR}%"))
                )
            }
            _ => format!("{column} {} {}", operator.predicate_token(), sql_value(value)),
        }
    }
}

/// Generates a predicate with the default layout.
pub fn generate(tree: &FilterTree, catalog: &dyn FieldCatalog) -> Result<Predicate, ResolutionError> {
    PredicateGenerator::new(catalog, GeneratorOptions::default()).generate(tree)
}

fn join(operator: BooleanOperator, mut parts: Vec<String>) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(format!(
            "({})",
            parts.join(&format!(" {} ", operator.predicate_token()))
        )),
    }
}

/// Renders a literal as an SQL value.
fn sql_value(value: &Literal) -> String {
    match value {
        Literal::Null => "NULL".to_string(),
        Literal::Bool(b) => i32::from(*b).to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(x) if x.is_finite() => x.to_string(),
        Literal::Float(_) => "NULL".to_string(),
        Literal::Text(s) => sql_string(s),
        Literal::List(items) => format!(
            "({})",
            items.iter().map(sql_value).collect::<Vec<_>>().join(", ")
        ),
        Literal::Wordset(name) => format!(
            "(SELECT `value` FROM `wordsets` WHERE `name` = {})",
            sql_string(name)
        ),
    }
}

fn sql_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
