//! Persisted access/refresh credential pair.
//!
//! The API client never touches storage directly; it is handed a
//! `TokenStore` and reads/writes the two values through it. Three
//! backends are provided:
//!
//! - `MemoryTokenStore`: process memory only (tests, one-shot scripts)
//! - `FileTokenStore`: JSON file under the user's data directory
//! - `KeyringTokenStore`: OS keychain entries via `keyring`

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Storage key for the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Keychain service name
const SERVICE_NAME: &str = "nurastays";

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// A complete credential pair as returned by login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Credential storage used by the API client and session manager.
///
/// Each call is atomic on its own; nothing coordinates across requests.
/// Reads return `Ok(None)` only when the token is absent; a backend that
/// cannot be read (locked keychain, denied access) returns `Err`, and the
/// client refuses to send the request rather than send it unauthenticated.
pub trait TokenStore: Send + Sync {
    fn get_access(&self) -> Result<Option<String>>;

    fn get_refresh(&self) -> Result<Option<String>>;

    /// Store a full pair (login).
    fn set_tokens(&self, tokens: &TokenPair) -> Result<()>;

    /// Replace only the access token (refresh).
    fn set_access(&self, access: &str) -> Result<()>;

    /// Remove both tokens.
    fn clear(&self) -> Result<()>;

    /// True when an access token is stored and readable
    fn has_tokens(&self) -> bool {
        matches!(self.get_access(), Ok(Some(_)))
    }
}

/// On-disk / in-memory shape of the two keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "access_token", default, skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(rename = "refresh_token", default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

impl StoredTokens {
    fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

fn lock(tokens: &Mutex<StoredTokens>) -> MutexGuard<'_, StoredTokens> {
    // A panic while holding the guard cannot leave the two strings half-written
    tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out with a stored pair
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        Self {
            tokens: Mutex::new(StoredTokens {
                access: Some(tokens.access.clone()),
                refresh: Some(tokens.refresh.clone()),
            }),
        }
    }

    /// Start out with only an access token stored
    pub fn with_access(access: impl Into<String>) -> Self {
        Self {
            tokens: Mutex::new(StoredTokens {
                access: Some(access.into()),
                refresh: None,
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_access(&self) -> Result<Option<String>> {
        Ok(lock(&self.tokens).access.clone())
    }

    fn get_refresh(&self) -> Result<Option<String>> {
        Ok(lock(&self.tokens).refresh.clone())
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<()> {
        let mut stored = lock(&self.tokens);
        stored.access = Some(tokens.access.clone());
        stored.refresh = Some(tokens.refresh.clone());
        Ok(())
    }

    fn set_access(&self, access: &str) -> Result<()> {
        lock(&self.tokens).access = Some(access.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *lock(&self.tokens) = StoredTokens::default();
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// Write-through token file. The file is read once at open; afterwards the
/// in-memory copy is authoritative and every change is flushed to disk.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<StoredTokens>,
}

impl FileTokenStore {
    /// Open (or lazily create) the token file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tokens = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read token file")?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable token file");
                StoredTokens::default()
            })
        } else {
            StoredTokens::default()
        };
        debug!(path = %path.display(), has_access = tokens.access.is_some(), "Token file opened");

        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(SERVICE_NAME).join(TOKEN_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        if tokens.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict token file permissions")?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get_access(&self) -> Result<Option<String>> {
        Ok(lock(&self.tokens).access.clone())
    }

    fn get_refresh(&self) -> Result<Option<String>> {
        Ok(lock(&self.tokens).refresh.clone())
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<()> {
        let mut stored = lock(&self.tokens);
        stored.access = Some(tokens.access.clone());
        stored.refresh = Some(tokens.refresh.clone());
        self.persist(&stored)
    }

    fn set_access(&self, access: &str) -> Result<()> {
        let mut stored = lock(&self.tokens);
        stored.access = Some(access.to_string());
        self.persist(&stored)
    }

    fn clear(&self) -> Result<()> {
        let mut stored = lock(&self.tokens);
        *stored = StoredTokens::default();
        self.persist(&stored)
    }
}

// ============================================================================
// Keyring
// ============================================================================

/// Stores each token as its own keychain entry under the `nurastays` service.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        read_entry(self.entry(key)?.get_password())
            .with_context(|| format!("Failed to read {} from keychain", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// A missing entry is an absent token; any other keychain failure is an error.
fn read_entry(result: keyring::Result<String>) -> Result<Option<String>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get_access(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn get_refresh(&self) -> Result<Option<String>> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        self.set(REFRESH_TOKEN_KEY, &tokens.refresh)
    }

    fn set_access(&self, access: &str) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, access)
    }

    fn clear(&self) -> Result<()> {
        // Attempt both even if the first fails
        let access = self.delete(ACCESS_TOKEN_KEY);
        let refresh = self.delete(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }
}
