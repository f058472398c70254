//! Authentication module for managing admin sessions and credentials.
//!
//! This module provides:
//! - `TokenStore`: the persisted access/refresh pair, with memory, file and
//!   OS keychain backends
//! - `LoginRedirect`: hook fired when the session cannot be recovered
//! - `SessionManager`: login, logout and start-up verification

pub mod redirect;
pub mod session;
pub mod tokens;

pub use redirect::{LogRedirect, LoginRedirect, RecordingRedirect};
pub use session::SessionManager;
pub use tokens::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
