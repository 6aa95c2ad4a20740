use super::*;
use serde_json::json;

fn row(v: serde_json::Value) -> Row { v.as_object().cloned().unwrap() }

#[test]
fn test_create_and_list_databases() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path()).unwrap();
    assert!(store.list_databases().unwrap().is_empty());
    store.create_database("shop").unwrap();
    store.create_database("_auth").unwrap();
    // hidden directories are not databases
    std::fs::create_dir_all(tmp.path().join(".system")).unwrap();
    assert_eq!(store.list_databases().unwrap(), vec!["_auth".to_string(), "shop".to_string()]);
    assert!(store.create_database("shop").is_err());
}

#[test]
fn test_rejects_names_that_break_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path()).unwrap();
    assert!(store.create_database("a.b").is_err());
    assert!(store.create_database("../escape").is_err());
    assert!(store.create_database("").is_err());
}

#[test]
fn test_insert_and_read_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path()).unwrap();
    store.create_database("_auth").unwrap();
    store.create_collection("_auth", "_users", &Schema::users()).unwrap();
    let rows = vec![
        row(json!({"username": "alice", "password": "h1", "role": "READ"})),
        row(json!({"username": "bob", "password": "h2", "role": "WRITE"})),
    ];
    store.insert_records("_auth", "_users", &rows).unwrap();
    let back = store.read_records("_auth", "_users").unwrap();
    assert_eq!(back, rows);
    assert_eq!(store.list_collections("_auth").unwrap(), vec!["_users".to_string()]);
}

#[test]
fn test_unique_insert_rejects_collisions() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SharedStore::new(tmp.path()).unwrap();
    store.create_database("_auth").unwrap();
    store.create_collection("_auth", "_users", &Schema::users()).unwrap();
    let alice = row(json!({"username": "alice", "password": "h1", "role": "READ"}));
    store.insert_unique_records("_auth", "_users", "username", &[alice.clone()]).unwrap();

    let again = row(json!({"username": "alice", "password": "h2", "role": "ADMIN"}));
    assert!(store.insert_unique_records("_auth", "_users", "username", &[again]).is_err());
    let bob = row(json!({"username": "bob", "password": "h3", "role": "READ"}));
    assert!(store.insert_unique_records("_auth", "_users", "username", &[bob.clone(), bob.clone()]).is_err());
    let nameless = row(json!({"password": "h4", "role": "READ"}));
    assert!(store.insert_unique_records("_auth", "_users", "username", &[nameless]).is_err());

    assert_eq!(store.read_records("_auth", "_users").unwrap(), vec![alice]);
}

#[test]
fn test_bad_batch_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path()).unwrap();
    store.create_database("shop").unwrap();
    let schema = Schema::from_pairs([("sku", FieldType::String), ("qty", FieldType::Int)]);
    store.create_collection("shop", "orders", &schema).unwrap();
    let rows = vec![
        row(json!({"sku": "a-1", "qty": 3})),
        row(json!({"sku": "a-2", "qty": "three"})),
    ];
    let err = store.insert_records("shop", "orders", &rows).unwrap_err();
    assert!(format!("{:#}", err).contains("qty"), "unexpected error: {:#}", err);
    assert!(store.read_records("shop", "orders").unwrap().is_empty());

    let unknown = vec![row(json!({"sku": "a-3", "colour": "red"}))];
    assert!(store.insert_records("shop", "orders", &unknown).is_err());
}

#[test]
fn test_collection_requires_database() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::new(tmp.path()).unwrap();
    assert!(store.create_collection("nope", "c", &Schema::permits()).is_err());
    assert!(store.read_records("nope", "c").is_err());
    assert!(store.list_collections("nope").is_err());
}

#[test]
fn test_schema_persists_across_handles() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SharedStore::new(tmp.path()).unwrap();
    store.create_database("shop").unwrap();
    store.create_collection("shop", "_permit", &Schema::permits()).unwrap();
    let reopened = Store::new(tmp.path()).unwrap();
    assert_eq!(reopened.load_schema("shop", "_permit").unwrap(), Schema::permits());
}

#[test]
fn test_schema_from_row() {
    let s = Schema::from_row(&row(json!({"name": "STRING", "age": "INT"}))).unwrap();
    assert_eq!(s.columns.get("age"), Some(&FieldType::Int));
    assert!(Schema::from_row(&row(json!({"name": "TEXT"}))).is_err());
    assert!(Schema::from_row(&row(json!({}))).is_err());
}

#[test]
fn test_traversal_names_never_exist() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("data");
    let store = Store::new(&root).unwrap();
    std::fs::create_dir_all(tmp.path().join("outside")).unwrap();
    assert!(!store.database_exists(".."));
    assert!(!store.collection_exists("..", "outside"));
    assert!(store.read_records("..", "outside").is_err());
}
