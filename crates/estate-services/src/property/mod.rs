//! Property lifecycle: creation with images, updates and removal.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

use std::sync::Arc;

use estate_core::models::{NewProperty, Property, UpdatePropertyRequest};
use estate_core::{can_modify_property, AppError, PropertyStore, Role};
use estate_storage::image_prefix;
use validator::Validate;

use crate::cache::QueryCache;
use crate::upload::{UploadFile, UploadOrchestrator};

/// A freshly created property together with its stored image keys.
#[derive(Debug, Clone)]
pub struct PropertyImage {
    pub index: usize,
    pub key: String,
}

pub struct PropertyLifecycleService {
    store: Arc<dyn PropertyStore>,
    uploads: UploadOrchestrator,
    cache: Option<Arc<QueryCache>>,
}

impl PropertyLifecycleService {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        uploads: UploadOrchestrator,
        cache: Option<Arc<QueryCache>>,
    ) -> Self {
        Self {
            store,
            uploads,
            cache,
        }
    }

    async fn invalidate_listings(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate().await;
        }
    }

    /// Create a property and store its images.
    ///
    /// The record is only kept once every image is stored and its prefix is
    /// saved. On any failure the record is deleted and stored images are
    /// removed again.
    #[tracing::instrument(skip(self, property, images), fields(owner.id = %property.owner_id, images = images.len()))]
    pub async fn create_with_images(
        &self,
        property: NewProperty,
        images: Vec<UploadFile>,
    ) -> Result<(Property, Vec<PropertyImage>), AppError> {
        property.validate()?;

        if images.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one image is required".to_string(),
            ));
        }

        if !self
            .store
            .property_type_exists(property.property_type_id)
            .await?
        {
            return Err(AppError::InvalidInput("Invalid property type".to_string()));
        }

        if !self
            .store
            .property_category_exists(property.property_category_id)
            .await?
        {
            return Err(AppError::InvalidInput(
                "Invalid property category".to_string(),
            ));
        }

        let mut created = self.store.insert(&property).await?;
        let prefix = image_prefix(created.id);

        let keys = match self.uploads.upload_all(&prefix, images).await {
            Ok(keys) => keys,
            Err(report) => {
                self.remove_record(created.id).await;
                return Err(AppError::Storage(format!(
                    "Failed to upload file {}",
                    report.first_failed_index()
                )));
            }
        };

        if let Err(e) = self.store.set_image_prefix(created.id, &prefix).await {
            let orphaned = self.uploads.discard(&keys).await;
            if !orphaned.is_empty() {
                tracing::warn!(
                    property_id = %created.id,
                    orphaned = orphaned.len(),
                    "Some images could not be removed after a failed create"
                );
            }
            self.remove_record(created.id).await;
            return Err(e);
        }
        created.image_prefix = Some(prefix);

        self.invalidate_listings().await;

        tracing::info!(
            property_id = %created.id,
            images = keys.len(),
            "Property created"
        );

        let images = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| PropertyImage { index, key })
            .collect();

        Ok((created, images))
    }

    /// Best-effort removal of a half-created record. Listings cached while
    /// the record existed are dropped once it is gone.
    async fn remove_record(&self, id: i64) {
        match self.store.delete(id).await {
            Ok(_) => self.invalidate_listings().await,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    property_id = %id,
                    "Failed to delete property after failed create"
                );
            }
        }
    }

    /// Update descriptive fields. Only the owner or an admin may do this.
    #[tracing::instrument(skip(self, changes), fields(property.id = %id, actor.id = %actor_id))]
    pub async fn update(
        &self,
        id: i64,
        actor_id: i64,
        actor_role: Role,
        changes: UpdatePropertyRequest,
    ) -> Result<Property, AppError> {
        changes.validate()?;

        let existing = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        if !can_modify_property(actor_role, existing.owner_id, actor_id) {
            return Err(AppError::Forbidden(
                "Not authorized to update this property".to_string(),
            ));
        }

        if let Some(type_id) = changes.property_type_id {
            if !self.store.property_type_exists(type_id).await? {
                return Err(AppError::InvalidInput("Invalid property type".to_string()));
            }
        }
        if let Some(category_id) = changes.property_category_id {
            if !self.store.property_category_exists(category_id).await? {
                return Err(AppError::InvalidInput(
                    "Invalid property category".to_string(),
                ));
            }
        }

        let updated = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        self.invalidate_listings().await;

        Ok(updated)
    }

    /// Delete a property. Refused once any transaction references it.
    #[tracing::instrument(skip(self), fields(property.id = %id, actor.id = %actor_id))]
    pub async fn delete(&self, id: i64, actor_id: i64, actor_role: Role) -> Result<(), AppError> {
        let existing = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        if !can_modify_property(actor_role, existing.owner_id, actor_id) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this property".to_string(),
            ));
        }

        if self.store.has_transactions(id).await? {
            return Err(AppError::Conflict(
                "Cannot delete a property with existing transactions".to_string(),
            ));
        }

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Property not found".to_string()));
        }

        self.invalidate_listings().await;

        tracing::info!(property_id = %id, "Property deleted");
        Ok(())
    }
}
