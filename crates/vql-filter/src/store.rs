//! Saved filter storage with XDG path support.
//!
//! Named filters are kept as their JSON mappings in a single file at
//! `~/.local/share/vqlf/filters.json`, keyed by name.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::mapping::{from_mapping, to_mapping, MappingError};
use crate::tree::FilterTree;

/// Default store filename.
const STORE_FILENAME: &str = "filters.json";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "vqlf";

/// Errors that can occur during filter storage operations.
#[derive(Debug, Error)]
pub enum FilterStoreError {
    /// Failed to determine the XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    #[error("failed to read filter store '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write filter store '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create data directory '{path}': {source}")]
    CreateDirError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete filter store '{path}': {source}")]
    DeleteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in filter store '{path}': {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored mapping no longer reads back as a filter.
    #[error("saved filter '{name}' is invalid: {source}")]
    InvalidFilter {
        name: String,
        #[source]
        source: MappingError,
    },
}

/// Result type for filter store operations.
pub type Result<T> = std::result::Result<T, FilterStoreError>;

/// The named filters of one store file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedFilters {
    #[serde(default)]
    filters: BTreeMap<String, Value>,
}

impl SavedFilters {
    /// Stores `tree` under `name`, returning whether a filter was replaced.
    pub fn put(&mut self, name: impl Into<String>, tree: &FilterTree) -> bool {
        self.filters.insert(name.into(), to_mapping(tree)).is_some()
    }

    /// Rebuilds the filter saved under `name`.
    ///
    /// # Errors
    ///
    /// Returns `FilterStoreError::InvalidFilter` if the stored mapping is not
    /// a valid filter (e.g. after a hand edit).
    pub fn get(&self, name: &str) -> Result<Option<FilterTree>> {
        self.filters
            .get(name)
            .map(|mapping| {
                from_mapping(mapping).map_err(|source| FilterStoreError::InvalidFilter {
                    name: name.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Raw mapping saved under `name`.
    pub fn mapping(&self, name: &str) -> Option<&Value> {
        self.filters.get(name)
    }

    /// Removes `name`, returning whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.filters.remove(name).is_some()
    }

    /// Saved names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Persistent storage for named filters.
///
/// # Example
///
/// ```no_run
/// use vql_filter::filter::FilterCompiler;
/// use vql_filter::store::FilterStore;
///
/// let store = FilterStore::new()?;
/// let mut saved = store.load_or_default()?;
/// saved.put("rare", &FilterCompiler::compile("af < 0.01").unwrap());
/// store.save(&saved)?;
/// # Ok::<(), vql_filter::store::FilterStoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilterStore {
    path: PathBuf,
}

impl FilterStore {
    /// Creates a store at the default XDG data path.
    ///
    /// # Errors
    ///
    /// Returns `FilterStoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// Creates a store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default store path.
    ///
    /// On Unix: `~/.local/share/vqlf/filters.json`
    /// On macOS: `~/Library/Application Support/vqlf/filters.json`
    ///
    /// # Errors
    ///
    /// Returns `FilterStoreError::NoDataDir` if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(FilterStoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join(STORE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved filters.
    ///
    /// # Errors
    ///
    /// - `FilterStoreError::ReadError` if the file cannot be read (including
    ///   when it does not exist; see [`load_or_default`](Self::load_or_default)).
    /// - `FilterStoreError::JsonError` if the file is not valid JSON.
    pub fn load(&self) -> Result<SavedFilters> {
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            FilterStoreError::ReadError {
                path: self.path.clone(),
                source,
            }
        })?;
        let saved: SavedFilters =
            serde_json::from_str(&contents).map_err(|source| FilterStoreError::JsonError {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), filters = saved.len(), "Loaded saved filters");
        Ok(saved)
    }

    /// Loads the saved filters, or an empty set if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), except for a missing file.
    pub fn load_or_default(&self) -> Result<SavedFilters> {
        match self.load() {
            Ok(saved) => Ok(saved),
            Err(FilterStoreError::ReadError { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(SavedFilters::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the saved filters atomically (temp file, then rename).
    ///
    /// # Errors
    ///
    /// - `FilterStoreError::CreateDirError` if the directory cannot be created.
    /// - `FilterStoreError::WriteError` if the file cannot be written.
    pub fn save(&self, saved: &SavedFilters) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| FilterStoreError::CreateDirError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json =
            serde_json::to_string_pretty(saved).map_err(|source| FilterStoreError::JsonError {
                path: self.path.clone(),
                source,
            })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json).map_err(|source| FilterStoreError::WriteError {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| FilterStoreError::WriteError {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), filters = saved.len(), "Saved filters");
        Ok(())
    }

    /// Returns true if the store file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Deletes the store file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `FilterStoreError::DeleteError` if the file cannot be deleted.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FilterStoreError::DeleteError {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCompiler;
    use tempfile::tempdir;

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let store = FilterStore::with_path(dir.path().join("filters.json"));
        assert!(!store.exists());
        assert!(store.load_or_default().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let store = FilterStore::with_path(dir.path().join("filters.json"));
        assert!(matches!(
            store.load(),
            Err(FilterStoreError::ReadError { .. })
        ));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = FilterStore::with_path(dir.path().join("nested/deeper/filters.json"));
        store.save(&SavedFilters::default()).unwrap();
        assert!(store.exists());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_put_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = FilterStore::with_path(dir.path().join("filters.json"));
        let tree = FilterCompiler::compile("chr = 'chr1' AND (ref = 'A' OR ref = 'G')").unwrap();

        let mut saved = SavedFilters::default();
        assert!(!saved.put("snp", &tree));
        assert!(saved.put("snp", &tree));
        store.save(&saved).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["snp"]);
        let back = loaded.get("snp").unwrap().unwrap();
        assert!(back.structurally_eq(&tree));
        assert!(loaded.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_names_are_sorted() {
        let mut saved = SavedFilters::default();
        saved.put("zeta", &FilterTree::new());
        saved.put("alpha", &FilterTree::new());
        assert_eq!(saved.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
        assert!(saved.remove("zeta"));
        assert!(!saved.remove("zeta"));
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FilterStore::with_path(&path);
        match store.load_or_default() {
            Err(FilterStoreError::JsonError { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected JsonError, got {other:?}"),
        }
    }

    #[test]
    fn test_hand_edited_invalid_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(&path, r#"{"filters": {"bad": {"$nand": []}}}"#).unwrap();
        let saved = FilterStore::with_path(&path).load().unwrap();
        assert!(saved.mapping("bad").is_some());
        assert!(matches!(
            saved.get("bad"),
            Err(FilterStoreError::InvalidFilter { ref name, .. }) if name == "bad"
        ));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FilterStore::with_path(dir.path().join("filters.json"));
        store.save(&SavedFilters::default()).unwrap();
        store.delete().unwrap();
        assert!(!store.exists());
        store.delete().unwrap();
    }
}
