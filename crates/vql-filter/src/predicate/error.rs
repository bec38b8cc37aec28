//! Field resolution errors.

use strsim::levenshtein;
use thiserror::Error;

use crate::types::FieldPath;

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Appends a "did you mean" hint to `base` when there is a suggestion.
fn with_suggestion(base: String, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("{base}. Did you mean '{s}'?"),
        None => base,
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise returns `None`.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| {
            let distance = levenshtein(&query_lower, &name.to_lowercase());
            (name.to_string(), distance)
        })
        .min_by_key(|(_, d)| *d)?;

    // Only suggest if the distance is within threshold and not an exact match
    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

/// A field path the catalog cannot resolve.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// No field with this name in the expected category.
    #[error("{}", with_suggestion(format!("unknown field '{field}'"), suggestion.as_deref()))]
    UnknownField {
        field: FieldPath,
        /// Closest known field name.
        suggestion: Option<String>,
    },

    /// The instance named in the path does not exist.
    #[error("{}", with_suggestion(format!("unknown instance '{instance}' in '{field}'"), suggestion.as_deref()))]
    UnknownInstance {
        field: FieldPath,
        instance: String,
        /// Closest known instance name.
        suggestion: Option<String>,
    },

    /// A wildcard path over a catalog with no instances.
    #[error("'{field}' names every instance but the catalog has none")]
    NoInstances { field: FieldPath },

    /// The path has none of the recognised shapes.
    #[error("malformed field path '{field}'")]
    MalformedPath { field: FieldPath },
}
