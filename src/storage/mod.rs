//!
//! ceres storage module
//! --------------------
//! On-disk store for ceres using a two-level directory layout:
//! `database/collection`. Each collection directory holds a `schema.json`
//! declaring field types and a `records.jsonl` file with one JSON object per
//! line.
//!
//! Key responsibilities:
//! - Database and collection creation under the configured data directory.
//! - Schema-checked record insertion (all rows of a batch or none).
//! - Whole-collection reads for the executor.
//!
//! The public API centers around `Store`, shared across threads as
//! `SharedStore`, which serializes writers behind a lock.

use std::{fs, path::{Path, PathBuf}};
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use parking_lot::RwLock;
use tracing::debug;

mod paths;
mod io;
pub mod schema;

pub use schema::{FieldType, Schema};

/// One stored record: field name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Core on-disk storage handle rooted at the data directory.
#[derive(Clone, Debug)]
pub struct Store {
    /// Root folder for all databases.
    root: PathBuf,
}

impl Store {
    /// Create a new Store rooted at the given filesystem path.
    /// The directory is created if it does not already exist.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Names of all databases under the root, sorted. Hidden entries are skipped.
    pub fn list_databases(&self) -> Result<Vec<String>> { list_dirs(&self.root) }

    pub fn database_exists(&self, db: &str) -> bool { validate_name(db).is_ok() && self.db_dir(db).is_dir() }

    pub fn create_database(&self, db: &str) -> Result<()> {
        validate_name(db)?;
        let dir = self.db_dir(db);
        if dir.exists() { bail!("database {} already exists", db); }
        fs::create_dir_all(&dir)?;
        debug!(target: "ceres::storage", "create_database: db='{}' dir='{}'", db, dir.display());
        Ok(())
    }

    /// Remove a database directory and everything in it.
    pub fn delete_database(&self, db: &str) -> Result<()> {
        validate_name(db)?;
        let dir = self.db_dir(db);
        if !dir.exists() { bail!("database {} does not exist", db); }
        fs::remove_dir_all(&dir)?;
        debug!(target: "ceres::storage", "delete_database: db='{}'", db);
        Ok(())
    }

    pub fn list_collections(&self, db: &str) -> Result<Vec<String>> {
        if !self.database_exists(db) { bail!("database {} does not exist", db); }
        list_dirs(&self.db_dir(db))
    }

    pub fn collection_exists(&self, db: &str, collection: &str) -> bool {
        validate_name(db).is_ok() && validate_name(collection).is_ok() && self.schema_path(db, collection).is_file()
    }

    /// Create an empty collection and persist its schema.
    pub fn create_collection(&self, db: &str, collection: &str, schema: &Schema) -> Result<()> {
        validate_name(collection)?;
        if !self.database_exists(db) { bail!("database {} does not exist", db); }
        if self.collection_exists(db, collection) { bail!("collection {}.{} already exists", db, collection); }
        fs::create_dir_all(self.collection_dir(db, collection))?;
        schema.save(&self.schema_path(db, collection))?;
        fs::File::create(self.records_path(db, collection))?;
        debug!(target: "ceres::storage", "create_collection: {}.{} fields={:?}", db, collection, schema.field_names());
        Ok(())
    }

    pub fn load_schema(&self, db: &str, collection: &str) -> Result<Schema> {
        if !self.collection_exists(db, collection) { bail!("collection {}.{} does not exist", db, collection); }
        Schema::load(&self.schema_path(db, collection))
    }
}

fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() { continue; }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') { continue; }
        out.push(name);
    }
    out.sort();
    Ok(out)
}

// Names become single path segments; dots would break identifier splitting.
fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok { Ok(()) } else { Err(anyhow!("invalid name '{}'", name)) }
}

/// Thread-safe store handle. Readers run concurrently; inserts and creates
/// take the write side.
#[derive(Clone, Debug)]
pub struct SharedStore(pub Arc<RwLock<Store>>);

impl SharedStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> { Ok(Self(Arc::new(RwLock::new(Store::new(root)?)))) }

    pub fn list_databases(&self) -> Result<Vec<String>> { self.0.read().list_databases() }
    pub fn database_exists(&self, db: &str) -> bool { self.0.read().database_exists(db) }
    pub fn create_database(&self, db: &str) -> Result<()> { self.0.write().create_database(db) }
    pub fn delete_database(&self, db: &str) -> Result<()> { self.0.write().delete_database(db) }
    pub fn list_collections(&self, db: &str) -> Result<Vec<String>> { self.0.read().list_collections(db) }
    pub fn collection_exists(&self, db: &str, collection: &str) -> bool { self.0.read().collection_exists(db, collection) }
    pub fn create_collection(&self, db: &str, collection: &str, schema: &Schema) -> Result<()> { self.0.write().create_collection(db, collection, schema) }
    pub fn insert_records(&self, db: &str, collection: &str, rows: &[Row]) -> Result<()> { self.0.write().insert_records(db, collection, rows) }
    pub fn insert_unique_records(&self, db: &str, collection: &str, key: &str, rows: &[Row]) -> Result<()> {
        self.0.write().insert_unique_records(db, collection, key, rows)
    }
    pub fn read_records(&self, db: &str, collection: &str) -> Result<Vec<Row>> { self.0.read().read_records(db, collection) }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod storage_tests;
