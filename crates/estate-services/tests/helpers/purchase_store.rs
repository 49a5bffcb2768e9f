use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use estate_core::models::{NewTransaction, PropertyStatus, TransactionRecord};
use estate_core::{AppError, PurchaseCandidate, PurchaseStore, PurchaseUnit};
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Clone)]
pub struct StoredProperty {
    pub owner_id: i64,
    pub status: PropertyStatus,
    pub type_name: String,
}

#[derive(Default)]
struct Inner {
    properties: Mutex<HashMap<i64, StoredProperty>>,
    transactions: Mutex<Vec<TransactionRecord>>,
    row_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    next_id: AtomicI64,
    fail_insert: AtomicBool,
    fail_status_update: AtomicBool,
    fail_commit: AtomicBool,
    jitter: AtomicBool,
}

/// In-memory stand-in for the Postgres unit of work. Locking a property
/// takes a per-row async mutex that is held until the unit ends; writes are
/// staged and only become visible on commit.
#[derive(Clone, Default)]
pub struct MemoryPurchaseStore {
    inner: Arc<Inner>,
}

impl MemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(self, id: i64, owner_id: i64, type_name: &str) -> Self {
        self.inner.properties.lock().unwrap().insert(
            id,
            StoredProperty {
                owner_id,
                status: PropertyStatus::Available,
                type_name: type_name.to_string(),
            },
        );
        self
    }

    /// Yield a random number of times inside each step to shake up scheduling.
    pub fn with_jitter(self) -> Self {
        self.inner.jitter.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_insert(&self) {
        self.inner.fail_insert.store(true, Ordering::SeqCst);
    }

    pub fn fail_status_update(&self) {
        self.inner.fail_status_update.store(true, Ordering::SeqCst);
    }

    pub fn fail_commit(&self) {
        self.inner.fail_commit.store(true, Ordering::SeqCst);
    }

    pub fn status_of(&self, id: i64) -> Option<PropertyStatus> {
        self.inner
            .properties
            .lock()
            .unwrap()
            .get(&id)
            .map(|p| p.status)
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.inner.transactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PurchaseStore for MemoryPurchaseStore {
    async fn begin(&self) -> Result<Box<dyn PurchaseUnit>, AppError> {
        Ok(Box::new(MemoryPurchaseUnit {
            inner: self.inner.clone(),
            guards: Vec::new(),
            staged_transactions: Vec::new(),
            staged_statuses: Vec::new(),
        }))
    }
}

pub struct MemoryPurchaseUnit {
    inner: Arc<Inner>,
    guards: Vec<OwnedMutexGuard<()>>,
    staged_transactions: Vec<TransactionRecord>,
    staged_statuses: Vec<(i64, PropertyStatus)>,
}

impl MemoryPurchaseUnit {
    async fn jitter(&self) {
        if self.inner.jitter.load(Ordering::SeqCst) {
            let yields = rand::random_range(0..4);
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
        }
    }
}

#[async_trait]
impl PurchaseUnit for MemoryPurchaseUnit {
    async fn lock_property(&mut self, id: i64) -> Result<Option<PurchaseCandidate>, AppError> {
        self.jitter().await;
        let lock = self
            .inner
            .row_locks
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .clone();
        self.guards.push(lock.lock_owned().await);
        self.jitter().await;

        let properties = self.inner.properties.lock().unwrap();
        Ok(properties.get(&id).map(|p| PurchaseCandidate {
            id,
            owner_id: p.owner_id,
            status: p.status,
            property_type_name: p.type_name.clone(),
        }))
    }

    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, AppError> {
        self.jitter().await;
        if self.inner.fail_insert.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated insert failure".to_string()));
        }
        let record = TransactionRecord {
            id: self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            client_id: transaction.client_id,
            owner_id: transaction.owner_id,
            property_id: transaction.property_id,
            transaction_type: transaction.transaction_type,
            created_at: Utc::now(),
        };
        self.staged_transactions.push(record.clone());
        Ok(record)
    }

    async fn update_property_status(
        &mut self,
        id: i64,
        status: PropertyStatus,
    ) -> Result<(), AppError> {
        self.jitter().await;
        if self.inner.fail_status_update.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated update failure".to_string()));
        }
        self.staged_statuses.push((id, status));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        if self.inner.fail_commit.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated commit failure".to_string()));
        }
        {
            let mut properties = self.inner.properties.lock().unwrap();
            for (id, status) in &self.staged_statuses {
                if let Some(p) = properties.get_mut(id) {
                    p.status = *status;
                }
            }
        }
        self.inner
            .transactions
            .lock()
            .unwrap()
            .extend(self.staged_transactions.iter().cloned());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}
