use estate_core::{models::TransactionRecord, AppError};
use sqlx::{PgPool, Postgres};

/// Read access to completed transactions. Inserts happen only through
/// [`crate::PgPurchaseUnit`].
#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Transactions where the user is either the buyer or the seller
    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.operation = "select"))]
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<TransactionRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, TransactionRecord>(
            r#"
            SELECT id, client_id, owner_id, property_id, transaction_type, created_at
            FROM transactions
            WHERE client_id = $1 OR owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: i64) -> Result<Option<TransactionRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, TransactionRecord>(
            r#"
            SELECT id, client_id, owner_id, property_id, transaction_type, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
