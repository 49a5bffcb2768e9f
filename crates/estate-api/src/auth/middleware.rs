use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use estate_core::{AppError, Role};
use std::sync::Arc;

/// Resolve the bearer token into an [`AuthUser`] or answer 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    else {
        return HttpAppError(AppError::Unauthorized(
            "Missing authorization header".to_string(),
        ))
        .into_response();
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let claims = match state.jwt.verify(token.trim()) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let user = AuthUser::from(&claims);
    tracing::debug!(user_id = %user.user_id, role = %user.role, "Request authenticated");

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Only let callers whose role is in `allowed` through. Must run after
/// [`auth_middleware`].
pub async fn require_roles(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthUser>().copied() else {
        return HttpAppError(AppError::Unauthorized(
            "User not authenticated".to_string(),
        ))
        .into_response();
    };

    if !allowed.contains(&user.role) {
        tracing::debug!(user_id = %user.user_id, role = %user.role, "Role not permitted");
        return HttpAppError(AppError::Forbidden(
            "Insufficient permissions".to_string(),
        ))
        .into_response();
    }

    next.run(request).await
}
