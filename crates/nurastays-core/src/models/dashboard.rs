use serde::{Deserialize, Serialize};

use super::deserialize_decimal;

/// Admin overview counters from `admin/dashboard/stats/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DashboardStats {
    #[serde(default)]
    pub total_properties: u32,
    #[serde(default)]
    pub active_properties: u32,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub approved_reviews: u32,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_team_members: u32,
}
