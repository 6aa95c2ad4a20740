//! Per-action authorization: authenticate the caller, resolve the role that
//! governs the target resource, and apply the permission matrix.
//!
//! Every call re-reads the user and permit rows through the executor. Nothing
//! is cached, so grant changes apply to the next request.

use std::sync::Arc;

use tracing::debug;

use crate::aql::{Action, ActionVerb, Node, ResourceKind};
use crate::error::{AuthError, AuthResult};
use crate::exec::Executor;
use crate::storage::Row;

use super::credentials::verify_password;
use super::matrix::{self, Role, Verdict};

#[derive(Clone)]
pub struct Authorizer {
    executor: Arc<dyn Executor>,
}

impl Authorizer {
    pub fn new(executor: Arc<dyn Executor>) -> Self { Self { executor } }

    pub fn authorize(&self, username: &str, password: &str, action: &Action) -> AuthResult<()> {
        let by_name = Node::equals("username", username);

        let lookup = Action::new(ActionVerb::Get, ResourceKind::User, "").with_filter(by_name.clone());
        let user = self.single(&lookup, true)?.ok_or_else(|| {
            debug!(target: "ceres::auth", "deny: unknown user '{}'", username);
            AuthError::UserNotFound { username: username.to_string() }
        })?;
        if !verify_password(field(&user, "password"), password) {
            debug!(target: "ceres::auth", "deny: bad password for '{}'", username);
            return Err(AuthError::InvalidCredentials { username: username.to_string() });
        }

        let role = if action.resource_kind.is_database_scoped() {
            let database = action.database();
            let lookup = Action::new(ActionVerb::Get, ResourceKind::Permit, database).with_filter(by_name);
            let permit = self.single(&lookup, false)?.ok_or_else(|| {
                debug!(target: "ceres::auth", "deny: '{}' has no permit on '{}'", username, database);
                AuthError::DatabaseAccessDenied { username: username.to_string(), database: database.to_string() }
            })?;
            Role::from_stored(field(&permit, "role"))
        } else {
            Role::from_stored(field(&user, "role"))
        };

        match matrix::evaluate(action.verb, action.resource_kind, role) {
            Verdict::Allow => Ok(()),
            Verdict::Deny => {
                debug!(target: "ceres::auth", "deny: '{}' as {} may not {} {} '{}'", username, role.as_str(), action.verb, action.resource_kind, action.identifier);
                Err(AuthError::AccessDenied {
                    verb: action.verb.to_string(),
                    resource: action.resource_kind.to_string(),
                    identifier: action.identifier.clone(),
                })
            }
            Verdict::UnknownVerb => Err(AuthError::InvalidAction { verb: action.verb.to_string() }),
        }
    }

    /// Run a lookup that must match exactly one row. Zero or several matches
    /// give `None`.
    fn single(&self, lookup: &Action, strict: bool) -> AuthResult<Option<Row>> {
        let mut rows = self.executor.execute(lookup, &[], strict)?;
        if rows.len() != 1 { return Ok(None); }
        Ok(rows.pop())
    }
}

fn field<'a>(row: &'a Row, name: &str) -> &'a str {
    row.get(name).and_then(|v| v.as_str()).unwrap_or_default()
}

#[cfg(test)]
#[path = "authorizer_tests.rs"]
mod authorizer_tests;
