use async_trait::async_trait;
use estate_core::{
    models::{NewProperty, Property, PropertyFilter, UpdatePropertyRequest},
    AppError, PropertyStore,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

const HAS_TRANSACTIONS: &str = "Cannot delete a property with existing transactions";

/// Repository for property listings
#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside a LIKE pattern.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the listing query for a filter. Only set filters contribute a clause.
/// Records still waiting for their images are never listed.
pub(crate) fn list_query(filter: &PropertyFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT id, name, description, status, price, location, owner_id, image_prefix, \
         property_type_id, property_category_id, created_at, updated_at \
         FROM properties WHERE image_prefix IS NOT NULL",
    );

    if let Some(category_id) = filter.category_id {
        builder
            .push(" AND property_category_id = ")
            .push_bind(category_id);
    }
    if let Some(type_id) = filter.type_id {
        builder.push(" AND property_type_id = ").push_bind(type_id);
    }
    if let Some(description) = &filter.description {
        builder
            .push(" AND description ILIKE ")
            .push_bind(format!("%{}%", escape_like(description)));
    }
    if let Some(min_price) = filter.min_price {
        builder.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price <= ").push_bind(max_price);
    }

    builder.push(" ORDER BY created_at DESC, id DESC");
    builder
}

#[async_trait]
impl PropertyStore for PropertyRepository {
    #[tracing::instrument(skip(self, property), fields(db.table = "properties", db.operation = "insert"))]
    async fn insert(&self, property: &NewProperty) -> Result<Property, AppError> {
        let created = sqlx::query_as::<Postgres, Property>(
            r#"
            INSERT INTO properties (name, description, price, location, owner_id,
                                    property_type_id, property_category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, status, price, location, owner_id, image_prefix,
                      property_type_id, property_category_id, created_at, updated_at
            "#,
        )
        .bind(&property.name)
        .bind(&property.description)
        .bind(property.price)
        .bind(&property.location)
        .bind(property.owner_id)
        .bind(property.property_type_id)
        .bind(property.property_category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i64) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<Postgres, Property>(
            r#"
            SELECT id, name, description, status, price, location, owner_id, image_prefix,
                   property_type_id, property_category_id, created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "select"))]
    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        let mut builder = list_query(filter);
        let properties = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "update", db.record_id = %id))]
    async fn set_image_prefix(&self, id: i64, prefix: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE properties SET image_prefix = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(prefix)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Property {} not found", id)));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "properties", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: i64,
        changes: &UpdatePropertyRequest,
    ) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<Postgres, Property>(
            r#"
            UPDATE properties
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                location = COALESCE($5, location),
                property_type_id = COALESCE($6, property_type_id),
                property_category_id = COALESCE($7, property_category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, status, price, location, owner_id, image_prefix,
                      property_type_id, property_category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.location.as_deref())
        .bind(changes.property_type_id)
        .bind(changes.property_category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    /// Delete a property. A transaction committed since the caller checked
    /// still blocks the delete through its foreign key and maps to `Conflict`.
    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => Err(
                AppError::Conflict(HAS_TRANSACTIONS.to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.operation = "select", db.record_id = %id))]
    async fn has_transactions(&self, id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE property_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "property_types", db.operation = "select", db.record_id = %id))]
    async fn property_type_exists(&self, id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM property_types WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "property_categories", db.operation = "select", db.record_id = %id))]
    async fn property_category_exists(&self, id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM property_categories WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
