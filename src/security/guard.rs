//! Static write guard for the credential store. Applies to every caller,
//! administrators included, and never touches storage.

use crate::aql::{Action, ResourceKind};
use crate::error::{AuthError, AuthResult};

use super::{AUTH_DB, USERS_COLLECTION};

pub fn guard_system_resources(action: &Action) -> AuthResult<()> {
    match action.resource_kind {
        ResourceKind::Record | ResourceKind::Collection => {
            if action.database() == AUTH_DB {
                return Err(AuthError::ProtectedResource(format!("{} database", AUTH_DB)));
            }
            if action.collection() == Some(USERS_COLLECTION) {
                return Err(AuthError::ProtectedResource(format!("{} collection", USERS_COLLECTION)));
            }
        }
        ResourceKind::Database | ResourceKind::Permit => {
            if action.identifier == AUTH_DB {
                return Err(AuthError::ProtectedResource(format!("{} database", AUTH_DB)));
            }
        }
        ResourceKind::User => {}
    }
    Ok(())
}
