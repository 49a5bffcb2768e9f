use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::read_property_form;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use estate_core::models::{Property, PropertyFilter, PropertyListQuery, UpdatePropertyRequest};
use estate_core::AppError;
use estate_services::{property_list_key, Source};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PropertyListResponse {
    pub properties: Vec<Property>,
    pub source: Source,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub index: usize,
    pub key: String,
    pub url: String,
}

/// List properties matching the query filters, through the listing cache.
#[tracing::instrument(skip(state, query), fields(user_id = %auth.user_id))]
pub async fn list_properties(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PropertyListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = PropertyFilter::from(&query);
    let store = state.properties.clone();

    let (properties, source) = match &state.listing_cache {
        Some(cache) => {
            let key = property_list_key(&filter);
            let cached = cache
                .get_or_load(&key, || async { store.list(&filter).await })
                .await?;
            (cached.value, cached.source)
        }
        None => (store.list(&filter).await?, Source::Database),
    };

    tracing::debug!(count = properties.len(), source = ?source, "Properties listed");

    Ok(Json(PropertyListResponse { properties, source }))
}

pub async fn get_property(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let property = state
        .properties
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

    Ok(Json(json!({ "property": property })))
}

/// Multipart create: the record only survives if every image is stored.
#[tracing::instrument(skip(state, multipart), fields(user_id = %auth.user_id, operation = "create_property"))]
pub async fn create_property(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_property_form(multipart, state.config.max_upload_size_bytes).await?;
    let (new_property, images) = form.into_new_property(auth.user_id)?;

    let (property, stored) = state
        .lifecycle
        .create_with_images(new_property, images)
        .await?;

    let images: Vec<ImageResponse> = stored
        .into_iter()
        .map(|image| ImageResponse {
            url: state.storage.public_url(&image.key),
            index: image.index,
            key: image.key,
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Property created successfully",
            "data": property,
            "images": images,
        })),
    ))
}

#[tracing::instrument(skip(state, changes), fields(user_id = %auth.user_id, property_id = %id))]
pub async fn update_property(
    auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(changes): ValidatedJson<UpdatePropertyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let property = state
        .lifecycle
        .update(id, auth.user_id, auth.role, changes)
        .await?;

    Ok(Json(json!({
        "message": "Property updated successfully",
        "data": property,
    })))
}

#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, property_id = %id))]
pub async fn delete_property(
    auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.lifecycle.delete(id, auth.user_id, auth.role).await?;

    Ok(Json(json!({ "message": "Property deleted successfully" })))
}
