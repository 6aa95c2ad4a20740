//! Authorization error model and transport mapping helpers.
//! Every failure the gate can produce carries its kind up to the transport
//! boundary, which picks the externally visible status from it.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UserNotFound,
    InvalidCredentials,
    DatabaseAccessDenied,
    AccessDenied,
    InvalidAction,
    ProtectedResource,
    Execution,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user '{username}' does not exist")]
    UserNotFound { username: String },
    #[error("invalid password for user '{username}'")]
    InvalidCredentials { username: String },
    #[error("user '{username}' is not permitted to access database '{database}'")]
    DatabaseAccessDenied { username: String, database: String },
    #[error("access denied: {verb} on {resource} '{identifier}'")]
    AccessDenied { verb: String, resource: String, identifier: String },
    #[error("invalid action type '{verb}'")]
    InvalidAction { verb: String },
    #[error("{0} is protected from direct manipulation")]
    ProtectedResource(String),
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound { .. } => ErrorKind::UserNotFound,
            AuthError::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            AuthError::DatabaseAccessDenied { .. } => ErrorKind::DatabaseAccessDenied,
            AuthError::AccessDenied { .. } => ErrorKind::AccessDenied,
            AuthError::InvalidAction { .. } => ErrorKind::InvalidAction,
            AuthError::ProtectedResource(_) => ErrorKind::ProtectedResource,
            AuthError::Execution(_) => ErrorKind::Execution,
        }
    }

    pub fn code_str(&self) -> &'static str {
        match self.kind() {
            ErrorKind::UserNotFound => "user_not_found",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::DatabaseAccessDenied => "database_access_denied",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::InvalidAction => "invalid_action",
            ErrorKind::ProtectedResource => "protected_resource",
            ErrorKind::Execution => "exec_error",
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::UserNotFound | ErrorKind::InvalidCredentials => 401,
            ErrorKind::DatabaseAccessDenied | ErrorKind::AccessDenied | ErrorKind::ProtectedResource => 403,
            ErrorKind::InvalidAction => 400,
            ErrorKind::Execution => 500,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
