//! Nura Stays client core.
//!
//! An authenticated client for the Nura Stays property-rental backend:
//!
//! - `api`: `ApiClient` with bearer attachment and one-shot token
//!   refresh-and-retry, plus typed catalog and admin routes
//! - `auth`: token storage, login redirect hook, session manager
//! - `models`: backend data types
//! - `config`: base URL, login path, timeout and token storage settings

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionManager, TokenPair, TokenStore};
pub use config::Config;
