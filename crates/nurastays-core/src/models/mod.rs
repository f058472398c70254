//! Data models for the Nura Stays backend.
//!
//! Shapes follow the backend's JSON (snake_case field names):
//!
//! - `Property`, `PropertyImage`, `PropertyFilter`: the rental catalog
//! - `Review`, `ReviewStats`, `ReviewFilter`: guest reviews
//! - `TeamMember`, `TeamMemberForm`: the about/team page
//! - `Lead`, `LeadFilter`, `ContactSubmission`: contact-form submissions
//! - `DashboardStats`: admin overview counters
//! - Auth payloads: `LoginRequest`, `LoginResponse`, `AdminUser`, ...
//! - `Page<T>`: paginated list envelope

pub mod auth;
pub mod dashboard;
pub mod lead;
pub mod page;
pub mod property;
pub mod review;
pub mod team;

pub use auth::{AdminUser, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, VerifyResponse};
pub use dashboard::DashboardStats;
pub use lead::{ContactSubmission, Lead, LeadFilter, LeadUpdate};
pub use page::Page;
pub use property::{Property, PropertyFilter, PropertyForm, PropertyImage, PropertyType, PropertyOrdering};
pub use review::{Review, ReviewFilter, ReviewForm, ReviewStats};
pub use team::{Photo, SocialLinks, TeamMember, TeamMemberForm};

/// Query parameters as sent on the wire.
pub type QueryParams = Vec<(String, String)>;

// Helper to deserialize decimal fields sent either as "120.00" or 120
pub(crate) fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct DecimalVisitor;

    impl<'de> de::Visitor<'de> for DecimalVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid decimal: {}", v)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}
