use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Kind of listing, e.g. "rent" or "sale". The name drives the purchase outcome.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct PropertyType {
    pub id: i64,
    pub name: String,
}

/// Free-form grouping such as "apartment" or "house".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct PropertyCategory {
    pub id: i64,
    pub name: String,
}

/// Request DTO shared by type and category creation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCatalogEntryRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
}
