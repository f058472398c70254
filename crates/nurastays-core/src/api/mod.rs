//! REST API client module for the Nura Stays backend.
//!
//! This module provides the `ApiClient` for the public catalog (properties,
//! reviews, team, contact) and the admin back-office routes.
//!
//! The backend uses JWT bearer authentication: an access token obtained at
//! login and renewed through the refresh route when it expires.

pub mod client;
mod endpoints;
pub mod error;
pub mod request;

pub use client::{ApiClient, REFRESH_PATH};
pub use error::ApiError;
pub use request::{Body, FilePart, MultipartBody, RequestOptions};
