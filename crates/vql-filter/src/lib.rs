//! Boolean filter expressions for VQL `WHERE` clauses.
//!
//! A filter moves between four forms:
//!
//! - **Text**: `chr = 'chr1' AND (ref = 'A' OR ref = 'G')`, compiled by
//!   [`filter::FilterCompiler`] and rendered back by [`filter::to_vql`].
//! - **Tree**: a [`tree::FilterTree`] arena of logic and condition nodes,
//!   mutated through a [`tree::FilterEditor`] that notifies observers.
//! - **Mapping**: the JSON form used for storage and drag-and-drop (see
//!   [`mapping`]).
//! - **Predicate**: SQL text produced by [`predicate::PredicateGenerator`]
//!   against a [`predicate::FieldCatalog`], or a whole statement built by
//!   [`query::SelectQuery`].
//!
//! # Quick Start
//!
//! ```
//! use vql_filter::prelude::*;
//!
//! let catalog = StaticCatalog::default()
//!     .with_field("chr", FieldCategory::Plain, FieldType::Str)
//!     .with_field("ref", FieldCategory::Plain, FieldType::Str);
//!
//! let tree = FilterCompiler::compile("chr = 'chr1' AND (ref = 'A' OR ref = 'G')")?;
//! let predicate = generate(&tree, &catalog)?;
//! assert_eq!(
//!     predicate.text,
//!     "(`variants`.`chr` = 'chr1' AND (`variants`.`ref` = 'A' OR `variants`.`ref` = 'G'))"
//! );
//! # Ok::<(), vql_filter::Error>(())
//! ```

pub mod filter;
pub mod mapping;
pub mod operator;
pub mod predicate;
pub mod prelude;
pub mod query;
pub mod store;
pub mod tree;
pub mod types;

use thiserror::Error;

/// Any error the crate can raise.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] filter::SyntaxError),

    #[error(transparent)]
    Structural(#[from] tree::StructuralError),

    #[error(transparent)]
    Mapping(#[from] mapping::MappingError),

    #[error(transparent)]
    Resolution(#[from] predicate::ResolutionError),

    #[error(transparent)]
    Store(#[from] store::FilterStoreError),
}

impl Error {
    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Syntax(_) => 1,
            Error::Resolution(_) => 2,
            Error::Store(
                store::FilterStoreError::ReadError { .. }
                | store::FilterStoreError::WriteError { .. }
                | store::FilterStoreError::CreateDirError { .. }
                | store::FilterStoreError::DeleteError { .. },
            ) => 3,
            Error::Structural(_) | Error::Mapping(_) => 4,
            Error::Store(_) => 5,
        }
    }
}

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_errors_convert_with_question_mark() {
        fn compile() -> Result<tree::FilterTree> {
            Ok(filter::FilterCompiler::compile("a = ")?)
        }
        assert!(matches!(compile(), Err(Error::Syntax(_))));
    }

    #[test]
    fn test_error_display_is_transparent() {
        let err = Error::from(tree::StructuralError::RootRemoval);
        assert_eq!(err.to_string(), "the root node cannot be removed");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::from(filter::SyntaxError::EmptyExpression).exit_code(), 1);
        assert_eq!(
            Error::from(predicate::ResolutionError::NoInstances {
                field: types::FieldPath::new("samples.$any.gt"),
            })
            .exit_code(),
            2
        );
        assert_eq!(
            Error::from(store::FilterStoreError::ReadError {
                path: PathBuf::from("filters.json"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
            .exit_code(),
            3
        );
        assert_eq!(Error::from(tree::StructuralError::RootMove).exit_code(), 4);
        assert_eq!(Error::from(store::FilterStoreError::NoDataDir).exit_code(), 5);
    }
}
