//! Predicate generation.
//!
//! Turns the enabled part of a [`FilterTree`](crate::tree::FilterTree) into
//! SQL predicate text, resolving every field path against a
//! [`FieldCatalog`]:
//!
//! | path              | column                       |
//! |-------------------|------------------------------|
//! | `pos`             | `` `variants`.`pos` ``       |
//! | `ann.gene`        | `` `annotations`.`gene` ``   |
//! | `samples.boby.gt` | `` `sample_boby`.`gt` ``     |
//!
//! Table names come from [`TableLayout`]. Wildcard instance paths
//! (`samples.$any.gt`, `samples.$all.gt`) expand over every instance of the
//! catalog.

mod catalog;
mod error;
mod generator;
mod resolve;

pub use catalog::{FieldCatalog, FieldCategory, FieldInfo, FieldType, StaticCatalog};
pub use error::ResolutionError;
pub use generator::{generate, GeneratorOptions, Predicate, PredicateGenerator, LIST_SEPARATOR};
pub use resolve::{
    quote_identifier, FieldResolver, FieldScope, Resolution, ResolvedField, TableLayout,
};
