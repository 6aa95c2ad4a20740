//! Action execution over the local store.
//!
//! `Executor` is the seam the security layer queries through. It never
//! authorizes anything itself; callers run the guard and the authorizer first.

use anyhow::{Result, anyhow, bail};
use tracing::debug;

use crate::aql::{Action, ActionVerb, ResourceKind};
use crate::security::{AUTH_DB, PERMIT_COLLECTION, USERS_COLLECTION, credentials};
use crate::storage::{Row, Schema, SharedStore};
use crate::tprintln;

pub trait Executor: Send + Sync {
    /// Run `action`, returning matching rows. `inputs` carries POST payloads.
    /// With `strict`, reading a collection that does not exist is an error;
    /// otherwise it yields no rows.
    fn execute(&self, action: &Action, inputs: &[Row], strict: bool) -> Result<Vec<Row>>;
}

#[derive(Clone, Debug)]
pub struct StoreExecutor {
    store: SharedStore,
}

impl StoreExecutor {
    pub fn new(store: SharedStore) -> Self { Self { store } }

    /// Resolve the collection an action reads from or writes to.
    fn target(&self, action: &Action) -> Result<(String, String)> {
        match action.resource_kind {
            ResourceKind::User => Ok((AUTH_DB.to_string(), USERS_COLLECTION.to_string())),
            ResourceKind::Permit => Ok((action.database().to_string(), PERMIT_COLLECTION.to_string())),
            ResourceKind::Record => {
                let col = action.collection().ok_or_else(|| anyhow!("record identifier '{}' needs <database>.<collection>", action.identifier))?;
                Ok((action.database().to_string(), col.to_string()))
            }
            ResourceKind::Database | ResourceKind::Collection => bail!("{} has no backing collection", action.resource_kind),
        }
    }

    fn read(&self, action: &Action, strict: bool) -> Result<Vec<Row>> {
        let rows = match action.resource_kind {
            ResourceKind::Database => names_to_rows(self.store.list_databases()?),
            ResourceKind::Collection => {
                let db = action.database();
                if !self.store.database_exists(db) {
                    if strict { bail!("database {} does not exist", db); }
                    return Ok(Vec::new());
                }
                names_to_rows(self.store.list_collections(db)?)
            }
            _ => {
                let (db, col) = self.target(action)?;
                if !self.store.collection_exists(&db, &col) {
                    if strict { bail!("collection {}.{} does not exist", db, col); }
                    return Ok(Vec::new());
                }
                self.store.read_records(&db, &col)?
            }
        };
        Ok(match &action.filter {
            Some(f) => rows.into_iter().filter(|r| f.matches(r)).collect(),
            None => rows,
        })
    }

    fn post(&self, action: &Action, inputs: &[Row]) -> Result<Vec<Row>> {
        match action.resource_kind {
            ResourceKind::Database => {
                let db = action.identifier.as_str();
                self.store.create_database(db)?;
                self.store.create_collection(db, PERMIT_COLLECTION, &Schema::permits())?;
            }
            ResourceKind::Collection => {
                let col = action.collection().ok_or_else(|| anyhow!("collection identifier '{}' needs <database>.<collection>", action.identifier))?;
                let first = inputs.first().ok_or_else(|| anyhow!("POST COLLECTION needs a schema row"))?;
                self.store.create_collection(action.database(), col, &Schema::from_row(first)?)?;
            }
            ResourceKind::User => {
                let rows = inputs.iter().map(hash_user_row).collect::<Result<Vec<_>>>()?;
                self.store.insert_unique_records(AUTH_DB, USERS_COLLECTION, "username", &rows)?;
            }
            ResourceKind::Record | ResourceKind::Permit => {
                let (db, col) = self.target(action)?;
                self.store.insert_records(&db, &col, inputs)?;
            }
        }
        Ok(Vec::new())
    }
}

impl Executor for StoreExecutor {
    fn execute(&self, action: &Action, inputs: &[Row], strict: bool) -> Result<Vec<Row>> {
        debug!(target: "ceres::exec", "execute: {} {} '{}' strict={}", action.verb, action.resource_kind, action.identifier, strict);
        let out = match action.verb {
            ActionVerb::Get | ActionVerb::Filter => self.read(action, strict)?,
            ActionVerb::Count => {
                let mut r = Row::new();
                r.insert("count".into(), self.read(action, strict)?.len().into());
                vec![r]
            }
            ActionVerb::Post => self.post(action, inputs)?,
            other => bail!("{} is not supported by the local executor", other),
        };
        tprintln!("exec {} {} -> {} rows", action.verb, action.identifier, out.len());
        Ok(out)
    }
}

fn names_to_rows(names: Vec<String>) -> Vec<Row> {
    names.into_iter().map(|n| {
        let mut r = Row::new();
        r.insert("name".into(), n.into());
        r
    }).collect()
}

// Plaintext passwords never reach disk.
fn hash_user_row(row: &Row) -> Result<Row> {
    let mut out = row.clone();
    let plain = row.get("password").and_then(|v| v.as_str()).ok_or_else(|| anyhow!("user row needs a string password"))?;
    out.insert("password".into(), credentials::hash_password(plain)?.into());
    Ok(out)
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod exec_tests;
