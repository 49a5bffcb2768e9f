//! Persistence port for property records.
//!
//! The Postgres repository in `estate-db` implements this; services depend on
//! the trait so the lifecycle flow can run against an in-memory store in tests.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewProperty, Property, PropertyFilter, UpdatePropertyRequest};

#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn insert(&self, property: &NewProperty) -> Result<Property, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Property>, AppError>;

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError>;

    /// Attach the storage prefix under which the property's images live.
    async fn set_image_prefix(&self, id: i64, prefix: &str) -> Result<(), AppError>;

    /// Apply descriptive changes. Returns `None` when the property is gone.
    async fn update(
        &self,
        id: i64,
        changes: &UpdatePropertyRequest,
    ) -> Result<Option<Property>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn has_transactions(&self, id: i64) -> Result<bool, AppError>;

    async fn property_type_exists(&self, id: i64) -> Result<bool, AppError>;

    async fn property_category_exists(&self, id: i64) -> Result<bool, AppError>;
}
