use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::PropertyStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Rent,
}

impl TransactionType {
    /// Listings whose type is named "rent" are rented; everything else is sold.
    pub fn from_property_type_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("rent") {
            TransactionType::Rent
        } else {
            TransactionType::Buy
        }
    }

    /// Status the property takes once this transaction is recorded.
    pub fn resulting_status(self) -> PropertyStatus {
        match self {
            TransactionType::Buy => PropertyStatus::Sold,
            TransactionType::Rent => PropertyStatus::Rented,
        }
    }
}

/// Immutable proof that a property changed hands.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: i64,
    pub client_id: i64,
    pub owner_id: i64,
    pub property_id: i64,
    pub transaction_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransaction {
    pub client_id: i64,
    pub owner_id: i64,
    pub property_id: i64,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub property_id: i64,
}
