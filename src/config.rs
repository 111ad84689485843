//! Runtime configuration.
//!
//! Loaded from `config.json` in the platform config directory, then
//! overridden by environment variables:
//! - `STUDY_MANAGER_DB` - SQLite file path (default: platform data dir)
//! - `STUDY_MANAGER_ADVICE_URL` - advisory base URL
//! - `STUDY_MANAGER_HTTP_TIMEOUT_SECS` - request timeout for the advisory fetch

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::advisory::DEFAULT_BASE_URL;

const APP_NAME: &str = "study-manager";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    pub advice_base_url: String,
    /// Advisory request timeout. `None` keeps the HTTP client default.
    pub http_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            advice_base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads the config file plus environment overrides.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let mut config = match config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Applies overrides from `lookup` (the process environment in practice).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STUDY_MANAGER_DB").filter(|v| !v.is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("STUDY_MANAGER_ADVICE_URL").filter(|v| !v.is_empty()) {
            self.advice_base_url = url;
        }
        if let Some(raw) = lookup("STUDY_MANAGER_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.http_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid STUDY_MANAGER_HTTP_TIMEOUT_SECS={raw:?}"),
            }
        }
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}
