use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

use ceres::{CeresConfig, Gate, SharedStore, StoreExecutor};

fn main() -> anyhow::Result<()> {
    let cfg = CeresConfig::load()?;

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cfg.log_filter()))
        .context("invalid log level")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "ceres",
        "Ceres starting: RUST_LOG='{}', log_level={}, port={}, data_dir='{}'",
        rust_log, cfg.log_level, cfg.port, cfg.data_dir.display()
    );

    let store = SharedStore::new(&cfg.data_dir)?;
    let seeded = ceres::security::ensure_auth_store(&store, cfg.default_admin_password.as_deref()).context("bootstrapping credential store")?;
    if seeded {
        info!(target: "ceres", "seeded admin account; change its password before exposing the service");
    }
    let gate = Gate::new(Arc::new(StoreExecutor::new(store)));
    info!(target: "ceres", "credential store ready; reading requests from stdin");

    // One JSON request per line in, one JSON response per line out.
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        writeln!(stdout, "{}", gate.handle_line(&line))?;
        stdout.flush()?;
    }
    Ok(())
}
