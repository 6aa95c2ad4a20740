use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use super::Row;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
}

impl FieldType {
    fn accepts(&self, v: &serde_json::Value) -> bool {
        match (self, v) {
            (_, serde_json::Value::Null) => true,
            (FieldType::String, serde_json::Value::String(_)) => true,
            (FieldType::Int, serde_json::Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Float, serde_json::Value::Number(_)) => true,
            (FieldType::Bool, serde_json::Value::Bool(_)) => true,
            _ => false,
        }
    }
}

impl FromStr for FieldType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STRING" => Ok(FieldType::String),
            "INT" => Ok(FieldType::Int),
            "FLOAT" => Ok(FieldType::Float),
            "BOOL" => Ok(FieldType::Bool),
            other => Err(anyhow!("unknown field type '{}'", other)),
        }
    }
}

/// Declared field types of a collection, persisted as `{ "columns": { name: TYPE } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub columns: BTreeMap<String, FieldType>,
}

impl Schema {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, FieldType)>) -> Self {
        Self { columns: pairs.into_iter().map(|(k, t)| (k.to_string(), t)).collect() }
    }

    /// Fixed layout of `_auth/_users`.
    pub fn users() -> Self {
        Self::from_pairs([("username", FieldType::String), ("password", FieldType::String), ("role", FieldType::String)])
    }

    /// Layout of the per-database `_permit` collection.
    pub fn permits() -> Self {
        Self::from_pairs([("username", FieldType::String), ("role", FieldType::String)])
    }

    /// Parse a `{field: "TYPE"}` row, the shape a POST COLLECTION carries.
    pub fn from_row(row: &Row) -> Result<Self> {
        let mut columns: BTreeMap<String, FieldType> = BTreeMap::new();
        for (k, v) in row {
            let t = v.as_str().ok_or_else(|| anyhow!("type for field '{}' must be a string", k))?;
            columns.insert(k.clone(), t.parse::<FieldType>()?);
        }
        if columns.is_empty() { bail!("schema must declare at least one field"); }
        Ok(Self { columns })
    }

    pub fn field_names(&self) -> Vec<&str> { self.columns.keys().map(String::as_str).collect() }

    pub fn validate(&self, row: &Row) -> Result<()> {
        for (k, v) in row {
            let Some(t) = self.columns.get(k) else { bail!("unknown field '{}'", k); };
            if !t.accepts(v) { bail!("field '{}' expects {:?}, got {}", k, t, v); }
        }
        Ok(())
    }

    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
