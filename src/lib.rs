pub mod aql;
pub mod config;
pub mod error;
pub mod exec;
pub mod gate;
pub mod security;
pub mod storage;

pub use aql::{Action, ActionVerb, Node, ResourceKind};
pub use config::CeresConfig;
pub use error::{AuthError, AuthResult, ErrorKind};
pub use exec::{Executor, StoreExecutor};
pub use gate::{Credentials, Gate};
pub use storage::{Row, SharedStore};

// Test-only printing helper: expands to tprintln! during tests and is absent otherwise.
// Usage in tests: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
