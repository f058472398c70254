use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_decimal, QueryParams};

/// Listing categories offered by the catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Apartment,
    House,
    Studio,
    Villa,
    Cottage,
    Penthouse,
    #[serde(other)]
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Studio => "studio",
            PropertyType::Villa => "villa",
            PropertyType::Cottage => "cottage",
            PropertyType::Penthouse => "penthouse",
            PropertyType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "apartment" => Some(PropertyType::Apartment),
            "house" => Some(PropertyType::House),
            "studio" => Some(PropertyType::Studio),
            "villa" => Some(PropertyType::Villa),
            "cottage" => Some(PropertyType::Cottage),
            "penthouse" => Some(PropertyType::Penthouse),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PropertyImage {
    pub id: i64,
    pub image: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Property {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub max_guests: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub house_rules: Option<String>,
    #[serde(default)]
    pub cancellation_policy: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub primary_image: Option<String>,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Create/update payload for the admin property routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PropertyForm {
    pub name: String,
    pub location: String,
    pub description: String,
    pub short_description: String,
    pub price_per_night: Option<f64>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub max_guests: u32,
    pub property_type: PropertyType,
    pub amenities: Vec<String>,
    pub house_rules: String,
    pub cancellation_policy: String,
    pub is_active: bool,
    pub is_featured: bool,
}

impl Default for PropertyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: String::new(),
            description: String::new(),
            short_description: String::new(),
            price_per_night: None,
            bedrooms: 1,
            bathrooms: 1,
            max_guests: 2,
            property_type: PropertyType::Apartment,
            amenities: Vec::new(),
            house_rules: String::new(),
            cancellation_policy: String::new(),
            is_active: true,
            is_featured: false,
        }
    }
}

impl From<&Property> for PropertyForm {
    fn from(p: &Property) -> Self {
        Self {
            name: p.name.clone(),
            location: p.location.clone(),
            description: p.description.clone(),
            short_description: p.short_description.clone().unwrap_or_default(),
            price_per_night: p.price_per_night,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            max_guests: p.max_guests,
            property_type: p.property_type,
            amenities: p.amenities.clone(),
            house_rules: p.house_rules.clone().unwrap_or_default(),
            cancellation_policy: p.cancellation_policy.clone().unwrap_or_default(),
            is_active: p.is_active,
            is_featured: p.is_featured,
        }
    }
}

/// Catalog sort orders accepted by `?ordering=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyOrdering {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl PropertyOrdering {
    pub fn as_param(&self) -> &'static str {
        match self {
            PropertyOrdering::Newest => "-created_at",
            PropertyOrdering::PriceAsc => "price_per_night",
            PropertyOrdering::PriceDesc => "-price_per_night",
            PropertyOrdering::Name => "name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "-created_at" | "newest" => Some(PropertyOrdering::Newest),
            "price_per_night" | "price" => Some(PropertyOrdering::PriceAsc),
            "-price_per_night" | "-price" => Some(PropertyOrdering::PriceDesc),
            "name" => Some(PropertyOrdering::Name),
            _ => None,
        }
    }
}

/// Catalog filter state. Only the fields that are set become query params;
/// ordering and page are always sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub search: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_bedrooms: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub ordering: PropertyOrdering,
    pub page: u32,
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            search: None,
            property_type: None,
            min_bedrooms: None,
            min_price: None,
            max_price: None,
            ordering: PropertyOrdering::Newest,
            page: 1,
        }
    }
}

impl PropertyFilter {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self.page = 1;
        self
    }

    pub fn property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self.page = 1;
        self
    }

    pub fn min_bedrooms(mut self, bedrooms: u32) -> Self {
        self.min_bedrooms = Some(bedrooms);
        self.page = 1;
        self
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self.page = 1;
        self
    }

    pub fn ordering(mut self, ordering: PropertyOrdering) -> Self {
        self.ordering = ordering;
        self.page = 1;
        self
    }

    /// Move to another page without touching the other filters
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search".into(), search.to_string()));
        }
        if let Some(t) = self.property_type {
            params.push(("property_type".into(), t.as_str().to_string()));
        }
        if let Some(b) = self.min_bedrooms {
            params.push(("min_bedrooms".into(), b.to_string()));
        }
        if let Some(p) = self.min_price {
            params.push(("min_price".into(), p.to_string()));
        }
        if let Some(p) = self.max_price {
            params.push(("max_price".into(), p.to_string()));
        }
        params.push(("ordering".into(), self.ordering.as_param().to_string()));
        params.push(("page".into(), self.page.to_string()));
        params
    }
}
