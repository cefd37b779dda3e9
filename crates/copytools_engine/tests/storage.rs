use std::fs;

use copytools_engine::{
    ensure_data_dir, AtomicFileWriter, JsonFileStore, KeyValueStore, MemoryStore, StorageError,
    HISTORY_KEY, SETTINGS_KEY, STORAGE_FILENAME,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn creates_missing_data_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("data");
    assert!(!new_dir.exists());
    ensure_data_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("storage.json", "{}").unwrap();
    assert_eq!(first.file_name().unwrap(), "storage.json");
    let second = writer.write("storage.json", r#"{"a":1}"#).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), r#"{"a":1}"#);
}

#[test]
fn no_partial_file_when_data_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let store = JsonFileStore::new(&file_path);
    let err = store.set(SETTINGS_KEY, json!({})).unwrap_err();
    assert!(matches!(err, StorageError::Persist(_)));
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn missing_file_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path());
    assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
}

#[test]
fn file_store_keeps_other_keys_on_write() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path());

    store.set(SETTINGS_KEY, json!({ "enabled": false })).unwrap();
    store
        .set_many(&[(HISTORY_KEY, json!([])), ("lastUpdated", json!(42))])
        .unwrap();

    assert_eq!(
        store.get(SETTINGS_KEY).unwrap(),
        Some(json!({ "enabled": false }))
    );
    assert_eq!(store.get("lastUpdated").unwrap(), Some(json!(42)));
    assert_eq!(store.path(), temp.path().join(STORAGE_FILENAME));
}

#[test]
fn two_handles_see_each_others_writes() {
    let temp = TempDir::new().unwrap();
    let page_side = JsonFileStore::new(temp.path());
    let background_side = JsonFileStore::new(temp.path());

    page_side.set(SETTINGS_KEY, json!({ "enabled": true })).unwrap();
    assert_eq!(
        background_side.get(SETTINGS_KEY).unwrap(),
        Some(json!({ "enabled": true }))
    );
}

#[test]
fn corrupt_file_fails_reads_and_is_replaced_on_write() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path());
    fs::write(store.path(), "not json").unwrap();

    assert!(matches!(
        store.get(SETTINGS_KEY),
        Err(StorageError::Corrupt { .. })
    ));
    store.set(SETTINGS_KEY, json!({ "enabled": true })).unwrap();
    assert_eq!(
        store.get(SETTINGS_KEY).unwrap(),
        Some(json!({ "enabled": true }))
    );
}

#[test]
fn memory_store_can_reject_writes() {
    let store = MemoryStore::new();
    store.set(SETTINGS_KEY, json!({})).unwrap();
    store.set_fail_writes(true);

    assert!(matches!(
        store.set(HISTORY_KEY, json!([])),
        Err(StorageError::Rejected)
    ));
    assert_eq!(store.snapshot().len(), 1);
}
