use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryParams;

/// A contact-form submission as seen from the admin back-office.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update for a lead; unset fields are left alone by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LeadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

impl LeadUpdate {
    pub fn read(is_read: bool) -> Self {
        Self {
            is_read: Some(is_read),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub is_read: Option<bool>,
}

impl LeadFilter {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search".into(), search.to_string()));
        }
        if let Some(is_read) = self.is_read {
            params.push(("is_read".into(), is_read.to_string()));
        }
        params
    }
}

/// Public contact form body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}
