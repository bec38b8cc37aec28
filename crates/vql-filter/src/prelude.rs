//! Prelude module for convenient imports.
//!
//! ```
//! use vql_filter::prelude::*;
//! ```

// Error types
pub use crate::{Error, Result};

// Text form
pub use crate::filter::{to_vql, CompiledStatement, FilterCompiler, SyntaxError};

// Tree form
pub use crate::operator::{BooleanOperator, ComparisonOperator};
pub use crate::tree::{
    Condition, DragPayload, FilterEditor, FilterExpr, FilterNode, FilterTree, NodeId, NodeKind,
    StructuralError, TreeEvent, TreeObserver,
};
pub use crate::types::{FieldPath, Literal};

// Mapping form
pub use crate::mapping::{from_mapping, to_mapping, MappingError};

// Predicates and statements
pub use crate::predicate::{
    generate, FieldCatalog, FieldCategory, FieldInfo, FieldType, GeneratorOptions, Predicate,
    PredicateGenerator, ResolutionError, StaticCatalog, TableLayout,
};
pub use crate::query::SelectQuery;

// Storage
pub use crate::store::{FilterStore, FilterStoreError, SavedFilters};
