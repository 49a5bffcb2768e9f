//! Postgres unit of work for the purchase flow.
//!
//! The property row is locked with `SELECT ... FOR UPDATE`, so a second
//! purchase of the same property blocks until the first unit commits or rolls
//! back, then sees the updated status. A record whose images are still being
//! uploaded has no image prefix yet and is treated as missing. If a unit is
//! dropped without committing, sqlx rolls the transaction back.

use async_trait::async_trait;
use estate_core::{
    models::{NewTransaction, PropertyStatus, TransactionRecord},
    AppError, PurchaseCandidate, PurchaseStore, PurchaseUnit,
};
use sqlx::{PgPool, Postgres, Transaction};

#[derive(Clone)]
pub struct PgPurchaseStore {
    pool: PgPool,
}

impl PgPurchaseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseStore for PgPurchaseStore {
    async fn begin(&self) -> Result<Box<dyn PurchaseUnit>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPurchaseUnit { tx }))
    }
}

pub struct PgPurchaseUnit {
    tx: Transaction<'static, Postgres>,
}

#[derive(sqlx::FromRow)]
struct LockedPropertyRow {
    id: i64,
    owner_id: i64,
    status: PropertyStatus,
    property_type_name: String,
}

#[async_trait]
impl PurchaseUnit for PgPurchaseUnit {
    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "select_for_update", db.record_id = %id))]
    async fn lock_property(&mut self, id: i64) -> Result<Option<PurchaseCandidate>, AppError> {
        let row = sqlx::query_as::<Postgres, LockedPropertyRow>(
            r#"
            SELECT p.id, p.owner_id, p.status, t.name AS property_type_name
            FROM properties p
            JOIN property_types t ON t.id = p.property_type_id
            WHERE p.id = $1 AND p.image_prefix IS NOT NULL
            FOR UPDATE OF p
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|r| PurchaseCandidate {
            id: r.id,
            owner_id: r.owner_id,
            status: r.status,
            property_type_name: r.property_type_name,
        }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.operation = "insert"))]
    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, AppError> {
        let record = sqlx::query_as::<Postgres, TransactionRecord>(
            r#"
            INSERT INTO transactions (client_id, owner_id, property_id, transaction_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_id, owner_id, property_id, transaction_type, created_at
            "#,
        )
        .bind(transaction.client_id)
        .bind(transaction.owner_id)
        .bind(transaction.property_id)
        .bind(transaction.transaction_type)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "properties", db.operation = "update", db.record_id = %id))]
    async fn update_property_status(
        &mut self,
        id: i64,
        status: PropertyStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE properties SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Property {} not found", id)));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let unit = *self;
        unit.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        let unit = *self;
        unit.tx.rollback().await?;
        Ok(())
    }
}
