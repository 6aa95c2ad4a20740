//! Request gate: the path every inbound action takes before it reaches the
//! executor. Guard first, then authorization, then execution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aql::{Action, ActionVerb, ResourceKind};
use crate::error::{AuthError, AuthResult};
use crate::exec::Executor;
use crate::security::{Authorizer, Role, guard_system_resources};
use crate::storage::Row;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Gate {
    executor: Arc<dyn Executor>,
    authorizer: Authorizer,
}

impl Gate {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { authorizer: Authorizer::new(executor.clone()), executor }
    }

    pub fn process(&self, creds: &Credentials, action: &Action, inputs: &[Row]) -> AuthResult<Vec<Row>> {
        guard_system_resources(action)?;
        self.authorizer.authorize(&creds.username, &creds.password, action)?;
        let rows = self.executor.execute(action, inputs, true)?;
        if action.verb == ActionVerb::Post && action.resource_kind == ResourceKind::Database {
            self.grant_creator(&creds.username, &action.identifier)?;
        }
        Ok(rows)
    }

    /// A new database starts with an ADMIN permit for whoever created it.
    fn grant_creator(&self, username: &str, db: &str) -> AuthResult<()> {
        let mut permit = Row::new();
        permit.insert("username".into(), username.into());
        permit.insert("role".into(), Role::Admin.as_str().into());
        self.executor.execute(&Action::new(ActionVerb::Post, ResourceKind::Permit, db), &[permit], true)?;
        debug!(target: "ceres::auth", "granted {} ADMIN on new database {}", username, db);
        Ok(())
    }
}

/// One line of the JSON request protocol the binary reads from stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct GateRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub action: Action,
    #[serde(default)]
    pub inputs: Vec<Row>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum GateResponse {
    Rows { rows: Vec<Row> },
    Error { code: String, status: u16, message: String },
}

impl From<AuthError> for GateResponse {
    fn from(e: AuthError) -> Self {
        GateResponse::Error { code: e.code_str().to_string(), status: e.http_status(), message: e.to_string() }
    }
}

impl Gate {
    /// Decode one request line, run it, and encode the response line.
    pub fn handle_line(&self, line: &str) -> String {
        let resp = match serde_json::from_str::<GateRequest>(line) {
            Ok(req) => match self.process(&req.credentials, &req.action, &req.inputs) {
                Ok(rows) => GateResponse::Rows { rows },
                Err(e) => e.into(),
            },
            Err(e) => GateResponse::Error { code: "bad_request".into(), status: 400, message: e.to_string() },
        };
        serde_json::to_string(&resp).unwrap_or_else(|e| format!(r#"{{"code":"internal","status":500,"message":"{}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::StoreExecutor;
    use crate::security::ensure_auth_store;
    use crate::storage::SharedStore;

    fn gate() -> (tempfile::TempDir, Gate) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SharedStore::new(tmp.path()).unwrap();
        ensure_auth_store(&store, None).unwrap();
        (tmp, Gate::new(Arc::new(StoreExecutor::new(store))))
    }

    #[test]
    fn json_line_roundtrip() {
        let (_tmp, g) = gate();
        let out = g.handle_line(r#"{"username":"ceres","password":"ceres","action":{"type":"GET","resource":"DATABASE"}}"#);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["rows"][0]["name"], "_auth");
    }

    #[test]
    fn json_line_errors_carry_code_and_status() {
        let (_tmp, g) = gate();
        let out = g.handle_line(r#"{"username":"ceres","password":"ceres","action":{"type":"GET","resource":"RECORD","identifier":"_auth._users"}}"#);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["code"], "protected_resource");
        assert_eq!(v["status"], 403);

        let out = g.handle_line(r#"{"username":"ceres","password":"ceres","action":{"type":"TRUNCATE","resource":"RECORD"}}"#);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["code"], "bad_request");
        assert_eq!(v["status"], 400);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let c = Credentials::new("alice", "hunter2");
        assert!(!format!("{:?}", c).contains("hunter2"));
    }
}
