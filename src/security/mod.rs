//! Access control for ceres: credential store bootstrap, password checks,
//! the role matrix, the per-action authorizer, and the system write guard.
//! Keep each concern in its own sub-module; re-export the thin surface here.

pub mod credentials;
pub mod bootstrap;
pub mod matrix;
pub mod authorizer;
pub mod guard;

/// Database holding the credential store.
pub const AUTH_DB: &str = "_auth";
/// User collection inside `AUTH_DB`.
pub const USERS_COLLECTION: &str = "_users";
/// Per-database collection of role grants.
pub const PERMIT_COLLECTION: &str = "_permit";
/// Username of the seeded administrator.
pub const SEED_ADMIN: &str = "ceres";

pub use authorizer::Authorizer;
pub use bootstrap::ensure_auth_store;
pub use credentials::{hash_password, verify_password};
pub use guard::guard_system_resources;
pub use matrix::{Role, ResourceTier, Verdict};
