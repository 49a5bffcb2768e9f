use estate_core::{
    models::{PropertyCategory, PropertyType},
    AppError,
};
use sqlx::{PgPool, Postgres};

/// Property types and categories
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("{} already exists", what))
        }
        other => other.into(),
    }
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "property_types", db.operation = "select"))]
    pub async fn list_types(&self) -> Result<Vec<PropertyType>, AppError> {
        let types = sqlx::query_as::<Postgres, PropertyType>(
            "SELECT id, name FROM property_types ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    #[tracing::instrument(skip(self), fields(db.table = "property_types", db.operation = "insert"))]
    pub async fn create_type(&self, name: &str) -> Result<PropertyType, AppError> {
        sqlx::query_as::<Postgres, PropertyType>(
            "INSERT INTO property_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name.trim().to_lowercase())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Property type"))
    }

    #[tracing::instrument(skip(self), fields(db.table = "property_categories", db.operation = "select"))]
    pub async fn list_categories(&self) -> Result<Vec<PropertyCategory>, AppError> {
        let categories = sqlx::query_as::<Postgres, PropertyCategory>(
            "SELECT id, name FROM property_categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    #[tracing::instrument(skip(self), fields(db.table = "property_categories", db.operation = "insert"))]
    pub async fn create_category(&self, name: &str) -> Result<PropertyCategory, AppError> {
        sqlx::query_as::<Postgres, PropertyCategory>(
            "INSERT INTO property_categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Property category"))
    }
}
