use crate::auth::password::hash_password;
use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use estate_core::models::{CreateUserRequest, UserResponse};
use estate_core::{AppError, Role};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Self-registration. Every new account starts as a client.
#[tracing::instrument(skip(state, request), fields(operation = "create_user"))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let password_hash = hash_password(&request.password)?;
    let user = state
        .users
        .create(&request.name, &request.email, &password_hash, Role::Client)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "data": UserResponse::from(user),
        })),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %auth.user_id))]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let users: Vec<UserResponse> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(json!({ "users": users })))
}

#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, target_id = %id))]
pub async fn get_user(
    auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": UserResponse::from(user) })))
}
