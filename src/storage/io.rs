use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::{Row, Store};

impl Store {
    /// Append rows to a collection. Every row is checked against the schema
    /// before anything is written, so a bad batch leaves the file untouched.
    pub fn insert_records(&self, db: &str, collection: &str, rows: &[Row]) -> Result<()> {
        let schema = self.load_schema(db, collection)?;
        for (i, row) in rows.iter().enumerate() {
            schema.validate(row).with_context(|| format!("row {} rejected by {}.{}", i, db, collection))?;
        }
        let mut buf = String::new();
        for row in rows {
            buf.push_str(&serde_json::to_string(row)?);
            buf.push('\n');
        }
        let path = self.records_path(db, collection);
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        f.write_all(buf.as_bytes())?;
        f.sync_data()?;
        debug!(target: "ceres::storage", "insert_records: {}.{} rows={}", db, collection, rows.len());
        Ok(())
    }

    /// Insert rows whose string `key` field must not collide with a stored
    /// row or with another row of the same batch.
    pub fn insert_unique_records(&self, db: &str, collection: &str, key: &str, rows: &[Row]) -> Result<()> {
        let mut seen: HashSet<String> = self
            .read_records(db, collection)?
            .iter()
            .filter_map(|r| r.get(key).and_then(|v| v.as_str()).map(str::to_string))
            .collect();
        for (i, row) in rows.iter().enumerate() {
            let Some(value) = row.get(key).and_then(|v| v.as_str()) else {
                bail!("row {} for {}.{} needs a string '{}'", i, db, collection, key);
            };
            if !seen.insert(value.to_string()) {
                bail!("{} '{}' already exists in {}.{}", key, value, db, collection);
            }
        }
        self.insert_records(db, collection, rows)
    }

    pub fn read_records(&self, db: &str, collection: &str) -> Result<Vec<Row>> {
        if !self.collection_exists(db, collection) { bail!("collection {}.{} does not exist", db, collection); }
        let path = self.records_path(db, collection);
        if !path.exists() { return Ok(Vec::new()); }
        let reader = BufReader::new(std::fs::File::open(&path)?);
        let mut out = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let row: Row = serde_json::from_str(&line)
                .with_context(|| format!("corrupt record at {}:{}", path.display(), n + 1))?;
            out.push(row);
        }
        Ok(out)
    }
}
