//! Atomic purchase and rental of a property.
//!
//! A purchase runs inside one [`PurchaseUnit`]: lock the property, check it,
//! record the transaction and flip the status. Either everything commits or
//! the unit is rolled back, on every exit path.

use std::sync::Arc;

use estate_core::models::{NewTransaction, TransactionRecord, TransactionType};
use estate_core::{AppError, PurchaseStore, PurchaseUnit};

use crate::cache::QueryCache;

#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("Property {0} not found")]
    NotFound(i64),

    #[error("Property is not available")]
    NotAvailable,

    #[error("You cannot buy or rent your own property")]
    SelfTransaction,

    #[error("Failed to record the transaction")]
    Persistence(#[source] AppError),
}

impl From<PurchaseError> for AppError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::NotFound(_) => AppError::NotFound(err.to_string()),
            PurchaseError::NotAvailable | PurchaseError::SelfTransaction => {
                AppError::BadRequest(err.to_string())
            }
            PurchaseError::Persistence(source) => AppError::InternalWithSource {
                message: "Failed to record the transaction".to_string(),
                source: anyhow::Error::new(source),
            },
        }
    }
}

pub struct PurchaseCoordinator {
    store: Arc<dyn PurchaseStore>,
    cache: Option<Arc<QueryCache>>,
}

impl PurchaseCoordinator {
    pub fn new(store: Arc<dyn PurchaseStore>, cache: Option<Arc<QueryCache>>) -> Self {
        Self { store, cache }
    }

    /// Buy or rent `property_id` on behalf of `client_id`.
    ///
    /// Of several concurrent attempts on the same property at most one
    /// succeeds; the others see [`PurchaseError::NotAvailable`].
    #[tracing::instrument(skip(self), fields(property.id = %property_id, client.id = %client_id))]
    pub async fn purchase(
        &self,
        property_id: i64,
        client_id: i64,
    ) -> Result<TransactionRecord, PurchaseError> {
        let mut unit = self
            .store
            .begin()
            .await
            .map_err(PurchaseError::Persistence)?;

        let record = match Self::apply(unit.as_mut(), property_id, client_id).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(rollback_err) = unit.rollback().await {
                    tracing::error!(
                        error = %rollback_err,
                        property_id = %property_id,
                        "Failed to roll back purchase"
                    );
                }
                return Err(e);
            }
        };

        unit.commit().await.map_err(|e| {
            tracing::error!(error = %e, property_id = %property_id, "Failed to commit purchase");
            PurchaseError::Persistence(e)
        })?;

        if let Some(cache) = &self.cache {
            cache.invalidate().await;
        }

        tracing::info!(
            transaction_id = %record.id,
            property_id = %property_id,
            client_id = %client_id,
            transaction_type = ?record.transaction_type,
            "Property transaction recorded"
        );

        Ok(record)
    }

    async fn apply(
        unit: &mut dyn PurchaseUnit,
        property_id: i64,
        client_id: i64,
    ) -> Result<TransactionRecord, PurchaseError> {
        let property = unit
            .lock_property(property_id)
            .await
            .map_err(PurchaseError::Persistence)?
            .ok_or(PurchaseError::NotFound(property_id))?;

        if !property.status.is_available() {
            return Err(PurchaseError::NotAvailable);
        }

        if property.owner_id == client_id {
            return Err(PurchaseError::SelfTransaction);
        }

        let transaction_type = TransactionType::from_property_type_name(&property.property_type_name);

        let record = unit
            .insert_transaction(&NewTransaction {
                client_id,
                owner_id: property.owner_id,
                property_id,
                transaction_type,
            })
            .await
            .map_err(PurchaseError::Persistence)?;

        unit.update_property_status(property_id, transaction_type.resulting_status())
            .await
            .map_err(PurchaseError::Persistence)?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::ErrorMetadata;

    #[test]
    fn test_purchase_errors_map_to_http_statuses() {
        let cases = [
            (PurchaseError::NotFound(4), 404),
            (PurchaseError::NotAvailable, 400),
            (PurchaseError::SelfTransaction, 400),
            (
                PurchaseError::Persistence(AppError::Internal("deadlock".to_string())),
                500,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status_code(), status);
        }
    }

    #[test]
    fn test_persistence_error_hides_details() {
        let err = AppError::from(PurchaseError::Persistence(AppError::Internal(
            "row lock timeout on properties".to_string(),
        )));
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
