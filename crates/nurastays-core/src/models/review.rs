use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_decimal, QueryParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub property: Option<i64>,
    #[serde(default)]
    pub property_name: Option<String>,
    pub guest_name: String,
    pub rating: u8,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/update payload for the admin review routes.
/// A review may stand on its own (`property: None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReviewForm {
    pub guest_name: String,
    pub rating: u8,
    pub review_text: String,
    pub property: Option<i64>,
    pub is_approved: bool,
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self {
            guest_name: String::new(),
            rating: 5,
            review_text: String::new(),
            property: None,
            is_approved: true,
        }
    }
}

impl From<&Review> for ReviewForm {
    fn from(r: &Review) -> Self {
        Self {
            guest_name: r.guest_name.clone(),
            rating: r.rating,
            review_text: r.review_text.clone(),
            property: r.property,
            is_approved: r.is_approved,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReviewStats {
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub average_rating: Option<f64>,
    /// Review count per star, keyed "1".."5"
    #[serde(default)]
    pub distribution: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewFilter {
    pub rating: Option<u8>,
    pub ordering: String,
    pub page: u32,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            rating: None,
            ordering: "-created_at".to_string(),
            page: 1,
        }
    }
}

impl ReviewFilter {
    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self.page = 1;
        self
    }

    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = ordering.into();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("ordering".to_string(), self.ordering.clone()),
        ];
        if let Some(r) = self.rating {
            params.push(("rating".into(), r.to_string()));
        }
        params
    }
}
