//! Integration tests for FilterStore.

use std::fs;

use serde_json::{json, Value};
use tempfile::tempdir;
use vql_filter::filter::FilterCompiler;
use vql_filter::store::{FilterStore, FilterStoreError, SavedFilters};

#[test]
fn test_save_and_load_roundtrip() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("filters.json");
    let store = FilterStore::with_path(&path);

    let mut saved = SavedFilters::default();
    saved.put("high", &FilterCompiler::compile("ann.impact = 'HIGH'").unwrap());
    saved.put(
        "rare_snp",
        &FilterCompiler::compile("af < 0.01 AND (ref = 'A' OR ref = 'G')").unwrap(),
    );
    store.save(&saved).expect("failed to save filters");
    assert!(path.exists(), "store file should exist after save");

    let loaded = store.load().expect("failed to load filters");
    assert_eq!(loaded, saved);
    assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["high", "rare_snp"]);
}

#[test]
fn test_file_holds_canonical_mappings() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = FilterStore::with_path(temp_dir.path().join("filters.json"));

    let mut saved = SavedFilters::default();
    saved.put("chr1", &FilterCompiler::compile("chr = 'chr1'").unwrap());
    store.save(&saved).unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!({"filters": {"chr1": {"$and": [
            {"field": "chr", "operator": "$eq", "value": "chr1"}
        ]}}})
    );
}

#[test]
fn test_overwrite_replaces_previous_file() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let store = FilterStore::with_path(temp_dir.path().join("filters.json"));

    let mut saved = SavedFilters::default();
    saved.put("a", &FilterCompiler::compile("pos > 1").unwrap());
    store.save(&saved).unwrap();

    saved.remove("a");
    store.save(&saved).unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_load_or_default_with_corrupted_file() {
    let temp_dir = tempdir().expect("failed to create temp dir");
    let path = temp_dir.path().join("filters.json");
    fs::write(&path, "not valid json").unwrap();

    let result = FilterStore::with_path(&path).load_or_default();
    assert!(matches!(result, Err(FilterStoreError::JsonError { .. })));
}

#[test]
fn test_default_path_ends_with_store_filename() {
    if let Ok(path) = FilterStore::default_path() {
        assert!(path.ends_with("vqlf/filters.json"));
    }
}
