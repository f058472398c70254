//! Client configuration.
//!
//! Settings come from `~/.config/nurastays/config.json` when present, with
//! environment variables layered on top:
//!
//! - `NURASTAYS_API_URL`: backend base URL (default `http://localhost:8000/api`)
//! - `NURASTAYS_LOGIN_PATH`: where to send the user when the session is gone
//! - `NURASTAYS_TIMEOUT_SECS`: HTTP timeout
//! - `NURASTAYS_TOKEN_STORE`: `file`, `keyring` or `memory`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "nurastays";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

pub const DEFAULT_LOGIN_PATH: &str = "/admin/login";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "NURASTAYS_API_URL";
pub const ENV_LOGIN_PATH: &str = "NURASTAYS_LOGIN_PATH";
pub const ENV_TIMEOUT_SECS: &str = "NURASTAYS_TIMEOUT_SECS";
pub const ENV_TOKEN_STORE: &str = "NURASTAYS_TOKEN_STORE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Keyring,
    Memory,
}

impl std::str::FromStr for TokenStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenStoreKind::File),
            "keyring" | "keychain" => Ok(TokenStoreKind::Keyring),
            "memory" => Ok(TokenStoreKind::Memory),
            other => Err(anyhow::anyhow!("Unknown token store: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub login_path: String,
    pub timeout_secs: u64,
    pub token_store: TokenStoreKind,
    /// Overrides the token file location for `TokenStoreKind::File`
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_store: TokenStoreKind::File,
            token_file: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(path) = get(ENV_LOGIN_PATH) {
            self.login_path = path;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))?;
        }
        if let Some(kind) = get(ENV_TOKEN_STORE) {
            self.token_store = kind.parse()?;
        }
        Ok(self)
    }

    /// Base URL with a trailing slash so relative paths join under it
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid API URL: {}", self.api_url))
    }

    /// Open the configured token backend
    pub fn open_token_store(&self) -> Result<Arc<dyn TokenStore>> {
        Ok(match self.token_store {
            TokenStoreKind::File => {
                let path = match self.token_file {
                    Some(ref path) => path.clone(),
                    None => FileTokenStore::default_path()?,
                };
                Arc::new(FileTokenStore::open(path)?)
            }
            TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
        })
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
