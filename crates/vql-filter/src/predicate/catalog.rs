//! Field catalog consumed by the predicate generator.

use serde::{Deserialize, Serialize};

/// Where a field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    /// A column of the main record table (`pos`).
    #[serde(alias = "variants")]
    Plain,
    /// A column of the joined per-record group table (`ann.gene`).
    #[serde(alias = "annotations")]
    Group,
    /// A per-instance column (`samples.<name>.gt`).
    #[serde(alias = "samples")]
    Instance,
}

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "integer")]
    Int,
    Float,
    #[serde(alias = "text", alias = "string")]
    Str,
    #[serde(alias = "boolean")]
    Bool,
}

/// One entry of [`FieldCatalog::list_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub category: FieldCategory,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, category: FieldCategory, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            category,
            field_type,
        }
    }
}

/// Read-only source of field and instance names.
///
/// Queried only while generating predicates; the parser never consults it.
pub trait FieldCatalog {
    /// Every known field.
    fn list_fields(&self) -> Vec<FieldInfo>;

    /// Every known instance name (e.g. sample names).
    fn list_instances(&self) -> Vec<String>;
}

/// A catalog held in memory, loadable from any serde format.
///
/// ```json
/// {
///   "fields": [{"name": "pos", "category": "variants", "type": "int"}],
///   "instances": ["boby", "sacha"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub instances: Vec<String>,
}

impl StaticCatalog {
    pub fn new(fields: Vec<FieldInfo>, instances: Vec<String>) -> Self {
        Self { fields, instances }
    }

    /// Adds a field.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        category: FieldCategory,
        field_type: FieldType,
    ) -> Self {
        self.fields.push(FieldInfo::new(name, category, field_type));
        self
    }

    /// Adds an instance name.
    pub fn with_instance(mut self, name: impl Into<String>) -> Self {
        self.instances.push(name.into());
        self
    }
}

impl FieldCatalog for StaticCatalog {
    fn list_fields(&self) -> Vec<FieldInfo> {
        self.fields.clone()
    }

    fn list_instances(&self) -> Vec<String> {
        self.instances.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_from_json_accepts_category_aliases() {
        let catalog: StaticCatalog = serde_json::from_str(
            r#"{
                "fields": [
                    {"name": "pos", "category": "variants", "type": "int"},
                    {"name": "gene", "category": "annotations", "type": "str"},
                    {"name": "gt", "category": "instance", "type": "integer"}
                ],
                "instances": ["boby"]
            }"#,
        )
        .unwrap();
        assert_eq!(
            catalog.list_fields(),
            vec![
                FieldInfo::new("pos", FieldCategory::Plain, FieldType::Int),
                FieldInfo::new("gene", FieldCategory::Group, FieldType::Str),
                FieldInfo::new("gt", FieldCategory::Instance, FieldType::Int),
            ]
        );
        assert_eq!(catalog.list_instances(), vec!["boby".to_string()]);
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog: StaticCatalog = toml::from_str(
            r#"
            instances = ["boby", "sacha"]

            [[fields]]
            name = "chr"
            category = "plain"
            type = "text"
            "#,
        )
        .unwrap();
        assert_eq!(catalog.fields.len(), 1);
        assert_eq!(catalog.fields[0].field_type, FieldType::Str);
        assert_eq!(catalog.instances.len(), 2);
    }

    #[test]
    fn test_catalog_builder() {
        let catalog = StaticCatalog::default()
            .with_field("af", FieldCategory::Plain, FieldType::Float)
            .with_instance("boby");
        assert_eq!(catalog.list_fields().len(), 1);
        assert_eq!(catalog.list_instances(), vec!["boby".to_string()]);
    }
}
