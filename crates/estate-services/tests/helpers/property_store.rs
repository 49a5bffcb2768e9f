use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use estate_core::models::{
    NewProperty, Property, PropertyFilter, PropertyStatus, UpdatePropertyRequest,
};
use estate_core::{AppError, PropertyStore};
use rust_decimal::Decimal;

/// In-memory property table with the catalog ids it accepts.
pub struct MemoryPropertyStore {
    properties: Mutex<BTreeMap<i64, Property>>,
    type_ids: HashSet<i64>,
    category_ids: HashSet<i64>,
    with_transactions: Mutex<HashSet<i64>>,
    next_id: AtomicI64,
    fail_set_prefix: AtomicBool,
    list_calls: AtomicI64,
    deleted: Mutex<Vec<i64>>,
}

impl Default for MemoryPropertyStore {
    fn default() -> Self {
        Self {
            properties: Mutex::new(BTreeMap::new()),
            type_ids: [1, 2].into_iter().collect(),
            category_ids: [1].into_iter().collect(),
            with_transactions: Mutex::new(HashSet::new()),
            next_id: AtomicI64::new(0),
            fail_set_prefix: AtomicBool::new(false),
            list_calls: AtomicI64::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryPropertyStore {
    /// Types 1 and 2 and category 1 exist.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_set_prefix(&self) {
        self.fail_set_prefix.store(true, Ordering::SeqCst);
    }

    pub fn mark_transacted(&self, id: i64) {
        self.with_transactions.lock().unwrap().insert(id);
    }

    pub fn count(&self) -> usize {
        self.properties.lock().unwrap().len()
    }

    pub fn snapshot(&self, id: i64) -> Option<Property> {
        self.properties.lock().unwrap().get(&id).cloned()
    }

    pub fn deleted_ids(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> i64 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

/// A valid listing owned by `owner_id`.
pub fn new_property(owner_id: i64) -> NewProperty {
    NewProperty {
        name: "Harbour loft".to_string(),
        description: "Two bedrooms with a sea view".to_string(),
        price: Decimal::new(250_000, 0),
        location: "Porto".to_string(),
        owner_id,
        property_type_id: 1,
        property_category_id: 1,
    }
}

#[async_trait]
impl PropertyStore for MemoryPropertyStore {
    async fn insert(&self, property: &NewProperty) -> Result<Property, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let created = Property {
            id,
            name: property.name.clone(),
            description: property.description.clone(),
            status: PropertyStatus::Available,
            price: property.price,
            location: property.location.clone(),
            owner_id: property.owner_id,
            image_prefix: None,
            property_type_id: property.property_type_id,
            property_category_id: property.property_category_id,
            created_at: now,
            updated_at: now,
        };
        self.properties
            .lock()
            .unwrap()
            .insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Property>, AppError> {
        Ok(self.snapshot(id))
    }

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<Property>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let properties = self.properties.lock().unwrap();
        Ok(properties
            .values()
            .rev()
            .filter(|p| p.image_prefix.is_some())
            .filter(|p| filter.category_id.is_none_or(|c| p.property_category_id == c))
            .filter(|p| filter.type_id.is_none_or(|t| p.property_type_id == t))
            .filter(|p| filter.min_price.is_none_or(|m| p.price >= m))
            .filter(|p| filter.max_price.is_none_or(|m| p.price <= m))
            .filter(|p| {
                filter.description.as_ref().is_none_or(|d| {
                    p.description.to_lowercase().contains(&d.to_lowercase())
                })
            })
            .cloned()
            .collect())
    }

    async fn set_image_prefix(&self, id: i64, prefix: &str) -> Result<(), AppError> {
        if self.fail_set_prefix.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated prefix failure".to_string()));
        }
        match self.properties.lock().unwrap().get_mut(&id) {
            Some(p) => {
                p.image_prefix = Some(prefix.to_string());
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Property {} not found", id))),
        }
    }

    async fn update(
        &self,
        id: i64,
        changes: &UpdatePropertyRequest,
    ) -> Result<Option<Property>, AppError> {
        let mut properties = self.properties.lock().unwrap();
        let Some(p) = properties.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            p.name = name.clone();
        }
        if let Some(description) = &changes.description {
            p.description = description.clone();
        }
        if let Some(price) = changes.price {
            p.price = price;
        }
        if let Some(location) = &changes.location {
            p.location = location.clone();
        }
        if let Some(type_id) = changes.property_type_id {
            p.property_type_id = type_id;
        }
        if let Some(category_id) = changes.property_category_id {
            p.property_category_id = category_id;
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let removed = self.properties.lock().unwrap().remove(&id).is_some();
        if removed {
            self.deleted.lock().unwrap().push(id);
        }
        Ok(removed)
    }

    async fn has_transactions(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.with_transactions.lock().unwrap().contains(&id))
    }

    async fn property_type_exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.type_ids.contains(&id))
    }

    async fn property_category_exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.category_ids.contains(&id))
    }
}
