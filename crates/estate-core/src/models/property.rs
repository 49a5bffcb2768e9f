use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Availability of a property. Purchases only move it forward:
/// `Available -> Sold | Rented`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Sold,
    Rented,
}

impl PropertyStatus {
    pub fn is_available(self) -> bool {
        self == PropertyStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: PropertyStatus,
    pub price: Decimal,
    pub location: String,
    pub owner_id: i64,
    pub image_prefix: Option<String>,
    pub property_type_id: i64,
    pub property_category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a property. Status always starts as `Available`
/// and the image prefix is attached once the uploads succeed.
#[derive(Debug, Clone, Validate)]
pub struct NewProperty {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: String,
    pub price: Decimal,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Location must be between 1 and 255 characters"
    ))]
    pub location: String,
    pub owner_id: i64,
    pub property_type_id: i64,
    pub property_category_id: i64,
}

/// Request DTO for updating a property. Owner and status are not editable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Location must be between 1 and 255 characters"
    ))]
    pub location: Option<String>,
    #[serde(default)]
    pub property_type_id: Option<i64>,
    #[serde(default)]
    pub property_category_id: Option<i64>,
}

/// Raw listing query parameters, as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    pub category_id: Option<String>,
    pub type_id: Option<String>,
    pub description: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Normalized listing filter. Values that do not parse are dropped rather
/// than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub category_id: Option<i64>,
    pub type_id: Option<i64>,
    pub description: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl PropertyFilter {
    /// Name/value pairs of the filters that are set, used to derive cache keys.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.category_id {
            pairs.push(("categoryId", v.to_string()));
        }
        if let Some(v) = self.type_id {
            pairs.push(("typeId", v.to_string()));
        }
        if let Some(v) = &self.description {
            pairs.push(("description", v.clone()));
        }
        if let Some(v) = self.min_price {
            pairs.push(("minPrice", v.normalize().to_string()));
        }
        if let Some(v) = self.max_price {
            pairs.push(("maxPrice", v.normalize().to_string()));
        }
        pairs
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl From<&PropertyListQuery> for PropertyFilter {
    fn from(query: &PropertyListQuery) -> Self {
        PropertyFilter {
            category_id: non_empty(&query.category_id).and_then(|s| s.parse().ok()),
            type_id: non_empty(&query.type_id).and_then(|s| s.parse().ok()),
            description: non_empty(&query.description).map(str::to_string),
            min_price: non_empty(&query.min_price).and_then(|s| s.parse().ok()),
            max_price: non_empty(&query.max_price).and_then(|s| s.parse().ok()),
        }
    }
}
