//! Service configuration: a JSON file overlaid with `CERES_*` environment
//! variables. Built once at startup and passed down by reference.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "CERES_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = ".ceres/config/config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct CeresConfig {
    pub log_level: String,
    pub home_dir: PathBuf,
    pub data_dir: PathBuf,
    pub index_dir: PathBuf,
    pub storage_line_limit: u64,
    pub port: u16,
    /// Seed password for the bootstrap admin. Only ever read from the environment.
    #[serde(skip)]
    pub default_admin_password: Option<String>,
}

impl Default for CeresConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            home_dir: PathBuf::from(".ceres"),
            data_dir: PathBuf::from(".ceres/data"),
            index_dir: PathBuf::from(".ceres/indices"),
            storage_line_limit: 1000,
            port: 7437,
            default_admin_password: None,
        }
    }
}

impl CeresConfig {
    /// Load from `CERES_CONFIG_PATH` (or the default path) and apply the
    /// process environment on top.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::from_file(Path::new(&path))?;
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Overlay values from `lookup`. Integers that fail to parse keep the
    /// file value; an empty admin password counts as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CERES_LOG_LEVEL") { self.log_level = v; }
        if let Some(v) = lookup("CERES_HOME_DIR") { self.home_dir = PathBuf::from(v); }
        if let Some(v) = lookup("CERES_DATA_DIR") { self.data_dir = PathBuf::from(v); }
        if let Some(v) = lookup("CERES_INDEX_DIR") { self.index_dir = PathBuf::from(v); }
        if let Some(v) = lookup("CERES_STORAGE_LINE_LIMIT").and_then(|v| v.parse().ok()) { self.storage_line_limit = v; }
        if let Some(v) = lookup("CERES_PORT").and_then(|v| v.parse().ok()) { self.port = v; }
        if let Some(v) = lookup("CERES_DEFAULT_ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            self.default_admin_password = Some(v);
        }
    }

    /// `RUST_LOG`-style directive for the configured level.
    pub fn log_filter(&self) -> String { self.log_level.to_ascii_lowercase() }
}
