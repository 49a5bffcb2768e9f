use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use estate_core::models::CreateTransactionRequest;
use serde_json::json;
use std::sync::Arc;

/// Buy or rent a property as the authenticated user.
#[tracing::instrument(skip(state, request), fields(user_id = %auth.user_id, operation = "create_transaction"))]
pub async fn create_transaction(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateTransactionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .purchases
        .purchase(request.property_id, auth.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transaction completed successfully",
            "data": record,
        })),
    ))
}

/// Transactions where the caller is the client or the owner.
pub async fn list_transactions(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let transactions = state.transactions.list_for_user(auth.user_id).await?;
    Ok(Json(json!({ "transactions": transactions })))
}
