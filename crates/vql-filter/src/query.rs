//! Full `SELECT` statement building.

use std::collections::BTreeSet;

use tracing::debug;

use crate::filter::CompiledStatement;
use crate::predicate::{
    quote_identifier, FieldCatalog, FieldScope, GeneratorOptions, PredicateGenerator,
    ResolutionError, ResolvedField,
};
use crate::tree::FilterTree;
use crate::types::FieldPath;

/// Sort key of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: FieldPath,
    pub descending: bool,
}

/// A `SELECT` over the plain table, its group table and instance tables.
///
/// # Example
///
/// ```
/// use vql_filter::filter::FilterCompiler;
/// use vql_filter::predicate::{FieldCategory, FieldType, StaticCatalog};
/// use vql_filter::query::SelectQuery;
///
/// let catalog = StaticCatalog::default()
///     .with_field("chr", FieldCategory::Plain, FieldType::Str)
///     .with_field("pos", FieldCategory::Plain, FieldType::Int);
/// let statement = FilterCompiler::compile_statement("SELECT chr FROM variants WHERE pos > 5").unwrap();
/// let sql = SelectQuery::from(statement).limit(10).to_sql(&catalog, &Default::default()).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT `variants`.`chr` AS `chr` FROM `variants` WHERE `variants`.`pos` > 5 LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub columns: Vec<FieldPath>,
    pub source: String,
    pub filter: FilterTree,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl From<CompiledStatement> for SelectQuery {
    fn from(statement: CompiledStatement) -> Self {
        Self::new(statement.columns, statement.source).with_filter(statement.tree)
    }
}

impl SelectQuery {
    /// Creates an unfiltered query.
    pub fn new(columns: Vec<FieldPath>, source: impl Into<String>) -> Self {
        Self {
            columns,
            source: source.into(),
            filter: FilterTree::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterTree) -> Self {
        self.filter = filter;
        self
    }

    /// Adds a sort key; keys apply in insertion order.
    pub fn order_by(mut self, field: impl Into<FieldPath>, descending: bool) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Renders the statement.
    ///
    /// Joins are added only for what the columns, the filter and the sort
    /// keys reference: the group table when any group field appears, and one
    /// aliased instance table per referenced instance. A source other than
    /// the plain table is treated as a named selection.
    ///
    /// # Errors
    ///
    /// Returns the first `ResolutionError` of a column, sort key or condition.
    pub fn to_sql(
        &self,
        catalog: &dyn FieldCatalog,
        options: &GeneratorOptions,
    ) -> Result<String, ResolutionError> {
        let generator = PredicateGenerator::new(catalog, options.clone());
        let resolver = generator.resolver();
        let layout = resolver.layout();

        let mut scopes: BTreeSet<FieldScope> = BTreeSet::new();

        let mut columns: Vec<ResolvedField> = Vec::new();
        for column in &self.columns {
            for field in resolver.resolve(column)?.fields() {
                scopes.insert(field.scope.clone());
                columns.push(field.clone());
            }
        }

        let predicate = generator.generate(&self.filter)?;
        for path in &predicate.fields {
            for field in resolver.resolve(path)?.fields() {
                scopes.insert(field.scope.clone());
            }
        }

        let mut order = Vec::new();
        for key in &self.order_by {
            for field in resolver.resolve(&key.field)?.fields() {
                scopes.insert(field.scope.clone());
                let direction = if key.descending { "DESC" } else { "ASC" };
                order.push(format!("{} {direction}", field.column));
            }
        }

        let plain = quote_identifier(&layout.plain_table);
        let plain_id = format!("{plain}.{}", quote_identifier("id"));

        let mut sql = String::from("SELECT ");
        if columns.is_empty() {
            sql.push_str(&plain_id);
        } else {
            let list: Vec<String> = columns
                .iter()
                .map(|field| format!("{} AS {}", field.column, quote_identifier(field.path.as_str())))
                .collect();
            sql.push_str(&list.join(", "));
        }
        sql.push_str(&format!(" FROM {plain}"));

        if scopes.contains(&FieldScope::Group) {
            let group = quote_identifier(&layout.group_table);
            sql.push_str(&format!(
                " LEFT JOIN {group} ON {group}.{} = {plain_id}",
                quote_identifier("variant_id")
            ));
        }

        for scope in &scopes {
            if let FieldScope::Instance(instance) = scope {
                let alias = quote_identifier(&layout.instance_alias(instance));
                sql.push_str(&format!(
                    " LEFT JOIN {} {alias} ON {alias}.{} = {plain_id} AND {alias}.{} = \
                     (SELECT {} FROM {} WHERE {} = {})",
                    quote_identifier(&layout.instance_table),
                    quote_identifier("variant_id"),
                    quote_identifier("sample_id"),
                    quote_identifier("id"),
                    quote_identifier(&layout.instance_prefix),
                    quote_identifier("name"),
                    sql_string(instance),
                ));
            }
        }

        if self.source != layout.plain_table {
            sql.push_str(&format!(
                " INNER JOIN {sv} ON {sv}.{variant_id} = {plain_id} \
                 INNER JOIN {s} ON {s}.{id} = {sv}.{selection_id} AND {s}.{name} = {source}",
                sv = quote_identifier("selection_has_variant"),
                s = quote_identifier("selections"),
                variant_id = quote_identifier("variant_id"),
                selection_id = quote_identifier("selection_id"),
                id = quote_identifier("id"),
                name = quote_identifier("name"),
                source = sql_string(&self.source),
            ));
        }

        if !predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.text);
        }

        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        debug!(
            columns = columns.len(),
            joins = scopes.len(),
            "Built select query"
        );
        Ok(sql)
    }
}

fn sql_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
