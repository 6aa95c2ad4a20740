use anyhow::{Context, Result};
use parking_lot::{Mutex, const_mutex};
use serde_json::json;
use tracing::{info, warn};

use crate::storage::{Row, Schema, SharedStore};

use super::{AUTH_DB, SEED_ADMIN, USERS_COLLECTION, credentials};

const FALLBACK_ADMIN_PASSWORD: &str = "ceres";

// Existence check and creation are separate filesystem steps.
static BOOTSTRAP_LOCK: Mutex<()> = const_mutex(());

/// Make sure the credential store exists, seeding one admin account when it
/// does not. The seed password is `admin_password` when given (the
/// `CERES_DEFAULT_ADMIN_PASSWORD` override), else `"ceres"`. Returns whether a
/// seed happened. Any error is fatal to startup; a partially created `_auth` is
/// removed before the error is returned.
pub fn ensure_auth_store(store: &SharedStore, admin_password: Option<&str>) -> Result<bool> {
    let _guard = BOOTSTRAP_LOCK.lock();
    let databases = store.list_databases().context("enumerating databases")?;
    if databases.iter().any(|d| d == AUTH_DB) {
        return Ok(false);
    }

    let password = admin_password.unwrap_or(FALLBACK_ADMIN_PASSWORD);
    let hash = credentials::hash_password(password).context("hashing seed admin password")?;

    store.create_database(AUTH_DB).context("creating credential database")?;
    if let Err(e) = seed(store, hash) {
        if let Err(cleanup) = store.delete_database(AUTH_DB) {
            warn!(target: "ceres::bootstrap", "could not remove partial {} database: {}", AUTH_DB, cleanup);
        }
        return Err(e);
    }
    info!(target: "ceres::bootstrap", "created {} database with seed admin '{}'", AUTH_DB, SEED_ADMIN);
    Ok(true)
}

fn seed(store: &SharedStore, hash: String) -> Result<()> {
    store.create_collection(AUTH_DB, USERS_COLLECTION, &Schema::users()).context("creating user collection")?;
    let admin: Row = json!({ "username": SEED_ADMIN, "password": hash, "role": "ADMIN" })
        .as_object()
        .cloned()
        .unwrap_or_default();
    store.insert_records(AUTH_DB, USERS_COLLECTION, &[admin]).context("inserting seed admin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_once() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        assert!(ensure_auth_store(&store, None).unwrap());
        assert!(!ensure_auth_store(&store, None).unwrap());
        let users = store.read_records(AUTH_DB, USERS_COLLECTION).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "ceres");
        assert_eq!(users[0]["role"], "ADMIN");
    }

    #[test]
    fn env_password_overrides_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        ensure_auth_store(&store, Some("hunter2")).unwrap();
        let users = store.read_records(AUTH_DB, USERS_COLLECTION).unwrap();
        let hash = users[0]["password"].as_str().unwrap();
        assert!(credentials::verify_password(hash, "hunter2"));
        assert!(!credentials::verify_password(hash, "ceres"));
    }

    #[test]
    fn existing_auth_database_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        store.create_database(AUTH_DB).unwrap();
        assert!(!ensure_auth_store(&store, None).unwrap());
        assert!(!store.collection_exists(AUTH_DB, USERS_COLLECTION));
    }

    #[test]
    fn unreadable_data_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SharedStore::new(tmp.path().join("data")).unwrap();
        std::fs::remove_dir_all(tmp.path().join("data")).unwrap();
        assert!(ensure_auth_store(&store, None).is_err());
    }

    #[test]
    fn concurrent_bootstraps_seed_one_admin() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        let seeded = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| ensure_auth_store(&store, None).unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).filter(|b| *b).count()
        });
        assert_eq!(seeded, 1);
        assert_eq!(store.read_records(AUTH_DB, USERS_COLLECTION).unwrap().len(), 1);
    }
}
