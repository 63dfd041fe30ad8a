use super::*;

#[test]
fn missing_file_means_no_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTokenStore::in_dir(dir.path());

    assert_eq!(store.load().expect("load"), None);
    store.clear().expect("clear on missing file");
    assert!(!store.path().exists());
}

#[test]
fn save_creates_parent_dirs_and_load_returns_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTokenStore::in_dir(&dir.path().join("nested").join("profile"));

    store.save("tok-123").expect("save");

    assert_eq!(store.load().expect("load").as_deref(), Some("tok-123"));
    let raw = fs::read_to_string(store.path()).expect("read");
    let parsed: Map<String, Value> = serde_json::from_str(&raw).expect("json");
    assert_eq!(parsed.get(TOKEN_STORAGE_KEY), Some(&Value::from("tok-123")));
}

#[test]
fn clear_removes_only_the_token_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE_NAME);
    fs::write(&path, r#"{"theme":"dark","token":"old"}"#).expect("seed");
    let store = FileTokenStore::new(&path);

    store.clear().expect("clear");

    assert_eq!(store.load().expect("load"), None);
    let raw = fs::read_to_string(&path).expect("read");
    let parsed: Map<String, Value> = serde_json::from_str(&raw).expect("json");
    assert_eq!(parsed.get("theme"), Some(&Value::from("dark")));
    assert!(!parsed.contains_key(TOKEN_STORAGE_KEY));
}

#[test]
fn corrupt_file_is_reported_on_load_and_replaced_on_clear() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE_NAME);
    fs::write(&path, "not json").expect("seed");
    let store = FileTokenStore::new(&path);

    assert!(matches!(store.load(), Err(TokenStoreError::Corrupt { .. })));
    store.clear().expect("clear");
    assert_eq!(store.load().expect("load"), None);
}

#[test]
fn empty_token_value_is_treated_as_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SESSION_FILE_NAME);
    fs::write(&path, r#"{"token":""}"#).expect("seed");

    assert_eq!(FileTokenStore::new(&path).load().expect("load"), None);
}

#[test]
fn memory_store_tracks_save_and_clear() {
    let store = MemoryTokenStore::with_token("seed");
    assert_eq!(store.load().expect("load").as_deref(), Some("seed"));

    store.save("next").expect("save");
    assert_eq!(store.stored().as_deref(), Some("next"));

    store.clear().expect("clear");
    assert_eq!(store.stored(), None);
}
