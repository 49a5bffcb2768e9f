//! Persistence port for the purchase flow.
//!
//! A [`PurchaseUnit`] is one atomic unit of work: everything written through
//! it becomes visible on [`PurchaseUnit::commit`] or not at all. Locking a
//! property holds it exclusively until the unit ends, so two units racing on
//! the same property are serialized.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTransaction, PropertyStatus, TransactionRecord};

/// Property state as seen under the row lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCandidate {
    pub id: i64,
    pub owner_id: i64,
    pub status: PropertyStatus,
    pub property_type_name: String,
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn PurchaseUnit>, AppError>;
}

#[async_trait]
pub trait PurchaseUnit: Send {
    /// Load the property and hold it exclusively until commit or rollback.
    async fn lock_property(&mut self, id: i64) -> Result<Option<PurchaseCandidate>, AppError>;

    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, AppError>;

    async fn update_property_status(
        &mut self,
        id: i64,
        status: PropertyStatus,
    ) -> Result<(), AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
