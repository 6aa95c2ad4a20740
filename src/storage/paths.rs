use std::path::PathBuf;

use super::Store;

impl Store {
    pub(crate) fn db_dir(&self, db: &str) -> PathBuf { self.root.join(db) }

    pub(crate) fn collection_dir(&self, db: &str, collection: &str) -> PathBuf { self.db_dir(db).join(collection) }

    pub(crate) fn schema_path(&self, db: &str, collection: &str) -> PathBuf { self.collection_dir(db, collection).join("schema.json") }

    pub(crate) fn records_path(&self, db: &str, collection: &str) -> PathBuf { self.collection_dir(db, collection).join("records.jsonl") }
}
