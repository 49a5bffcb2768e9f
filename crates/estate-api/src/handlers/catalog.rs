use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use estate_core::models::CreateCatalogEntryRequest;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

pub async fn list_types(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let types = state.catalog.list_types().await?;
    Ok(Json(json!({ "types": types })))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

#[tracing::instrument(skip(state, request), fields(operation = "create_property_type"))]
pub async fn create_type(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateCatalogEntryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let created = state.catalog.create_type(request.name.trim()).await?;
    tracing::info!(type_id = %created.id, name = %created.name, "Property type created");
    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

#[tracing::instrument(skip(state, request), fields(operation = "create_property_category"))]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateCatalogEntryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let created = state.catalog.create_category(request.name.trim()).await?;
    tracing::info!(category_id = %created.id, name = %created.name, "Property category created");
    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}
