//! Field path resolution against a catalog and a table layout.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::operator::BooleanOperator;
use crate::types::FieldPath;

use super::catalog::{FieldCatalog, FieldCategory};
use super::error::{find_similar_name, ResolutionError};

/// SQL names used when rendering field references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Table holding plain fields.
    pub plain_table: String,
    /// First path segment of group fields (`ann` in `ann.gene`).
    pub group_prefix: String,
    /// Table holding group fields.
    pub group_table: String,
    /// First path segment of instance fields (`samples` in `samples.boby.gt`).
    pub instance_prefix: String,
    /// Prefix of the per-instance table alias (`sample_boby`).
    pub instance_alias_prefix: String,
    /// Table holding per-instance fields.
    pub instance_table: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            plain_table: "variants".to_string(),
            group_prefix: "ann".to_string(),
            group_table: "annotations".to_string(),
            instance_prefix: "samples".to_string(),
            instance_alias_prefix: "sample_".to_string(),
            instance_table: "genotypes".to_string(),
        }
    }
}

impl TableLayout {
    /// Alias of the joined table for one instance.
    pub fn instance_alias(&self, instance: &str) -> String {
        format!("{}{}", self.instance_alias_prefix, instance)
    }
}

/// Quotes an SQL identifier with backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Which table a resolved field comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldScope {
    Plain,
    Group,
    /// The named instance's joined table.
    Instance(String),
}

/// A field path bound to a concrete column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// The concrete path (wildcards replaced by an instance name).
    pub path: FieldPath,
    /// Qualified, quoted column reference.
    pub column: String,
    pub scope: FieldScope,
}

/// Outcome of resolving one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Single(ResolvedField),
    /// A wildcard path: one field per instance, combined with `operator`
    /// (`OR` for `$any`, `AND` for `$all`).
    Expanded {
        operator: BooleanOperator,
        fields: Vec<ResolvedField>,
    },
}

impl Resolution {
    /// Every concrete field of the resolution.
    pub fn fields(&self) -> &[ResolvedField] {
        match self {
            Resolution::Single(field) => std::slice::from_ref(field),
            Resolution::Expanded { fields, .. } => fields,
        }
    }
}

/// Snapshot of a catalog, ready to resolve paths.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    plain: Vec<String>,
    group: Vec<String>,
    instance_fields: Vec<String>,
    instances: Vec<String>,
    layout: TableLayout,
}

impl FieldResolver {
    /// Reads the catalog once.
    pub fn new(catalog: &dyn FieldCatalog, layout: TableLayout) -> Self {
        let mut plain = Vec::new();
        let mut group = Vec::new();
        let mut instance_fields = Vec::new();
        for field in catalog.list_fields() {
            match field.category {
                FieldCategory::Plain => plain.push(field.name),
                FieldCategory::Group => group.push(field.name),
                FieldCategory::Instance => instance_fields.push(field.name),
            }
        }
        Self {
            plain,
            group,
            instance_fields,
            instances: catalog.list_instances(),
            layout,
        }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Resolves `path` to one or more concrete columns.
    ///
    /// # Errors
    ///
    /// Returns a `ResolutionError` for unknown fields or instances, for
    /// wildcards over an empty instance list, and for paths of no known shape.
    pub fn resolve(&self, path: &FieldPath) -> Result<Resolution, ResolutionError> {
        let text = path.as_str();
        if self.plain.iter().any(|name| name == text) {
            return Ok(Resolution::Single(self.plain_field(text)));
        }

        let segments: Vec<&str> = text.split('.').collect();
        match segments.as_slice() {
            [name] => Err(self.unknown_field(path, name, &self.plain)),
            [prefix, name] if *prefix == self.layout.group_prefix => {
                self.require(path, name, &self.group)?;
                Ok(Resolution::Single(ResolvedField {
                    path: path.clone(),
                    column: format!(
                        "{}.{}",
                        quote_identifier(&self.layout.group_table),
                        quote_identifier(name)
                    ),
                    scope: FieldScope::Group,
                }))
            }
            [prefix, .., name] if segments.len() >= 3 && *prefix == self.layout.instance_prefix => {
                self.require(path, name, &self.instance_fields)?;
                // Instance names may themselves contain dots
                let instance = segments[1..segments.len() - 1].join(".");
                self.resolve_instance(path, &instance, name)
            }
            _ => Err(ResolutionError::MalformedPath {
                field: path.clone(),
            }),
        }
    }

    fn resolve_instance(
        &self,
        path: &FieldPath,
        instance: &str,
        name: &str,
    ) -> Result<Resolution, ResolutionError> {
        let operator = match instance {
            FieldPath::ANY_INSTANCE => BooleanOperator::Or,
            FieldPath::ALL_INSTANCES => BooleanOperator::And,
            _ => {
                if !self.instances.iter().any(|known| known == instance) {
                    return Err(ResolutionError::UnknownInstance {
                        field: path.clone(),
                        instance: instance.to_string(),
                        suggestion: find_similar_name(
                            instance,
                            self.instances.iter().map(String::as_str),
                        ),
                    });
                }
                return Ok(Resolution::Single(self.instance_field(instance, name)));
            }
        };

        if self.instances.is_empty() {
            return Err(ResolutionError::NoInstances {
                field: path.clone(),
            });
        }
        let mut seen = HashSet::new();
        let fields = self
            .instances
            .iter()
            .filter(|instance| seen.insert(instance.as_str()))
            .map(|instance| self.instance_field(instance, name))
            .collect();
        Ok(Resolution::Expanded { operator, fields })
    }

    fn plain_field(&self, name: &str) -> ResolvedField {
        ResolvedField {
            path: FieldPath::new(name),
            column: format!(
                "{}.{}",
                quote_identifier(&self.layout.plain_table),
                quote_identifier(name)
            ),
            scope: FieldScope::Plain,
        }
    }

    fn instance_field(&self, instance: &str, name: &str) -> ResolvedField {
        ResolvedField {
            path: FieldPath::new(format!(
                "{}.{}.{}",
                self.layout.instance_prefix, instance, name
            )),
            column: format!(
                "{}.{}",
                quote_identifier(&self.layout.instance_alias(instance)),
                quote_identifier(name)
            ),
            scope: FieldScope::Instance(instance.to_string()),
        }
    }

    fn require(
        &self,
        path: &FieldPath,
        name: &str,
        known: &[String],
    ) -> Result<(), ResolutionError> {
        if known.iter().any(|k| k == name) {
            Ok(())
        } else {
            Err(self.unknown_field(path, name, known))
        }
    }

    fn unknown_field(&self, path: &FieldPath, name: &str, known: &[String]) -> ResolutionError {
        ResolutionError::UnknownField {
            field: path.clone(),
            suggestion: find_similar_name(name, known.iter().map(String::as_str)),
        }
    }
}
