//! Configuration and session storage locations

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{FileStorage, TokenStore};

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const API_URL_ENV: &str = "COMMANDES_API_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the clients/commandes API
    pub api_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "commandes-cli", "commandes-cli")
            .context("Could not determine config directory")
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path of the persisted session (access/refresh tokens)
    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("session.toml"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok();

        let mut config = if let Some(path) = path.filter(|p| p.exists()) {
            let content = fs::read_to_string(&path).context("Failed to read config file")?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("{} overrides api_url", API_URL_ENV);
                config.api_url = url;
            }
        }

        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Open the persisted token store.
    ///
    /// Without a data directory the session lives only as long as the
    /// process, and every command starts logged out.
    pub fn open_token_store() -> Result<TokenStore<FileStorage>> {
        token_store_at(Self::session_path().ok())
    }
}

fn token_store_at(path: Option<PathBuf>) -> Result<TokenStore<FileStorage>> {
    match path {
        Some(path) => Ok(TokenStore::new(FileStorage::open(path)?)),
        None => {
            tracing::warn!("No data directory available, session will not be saved");
            Ok(TokenStore::detached())
        }
    }
}
