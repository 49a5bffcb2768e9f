use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use estate_core::Role;
use serde::{Deserialize, Serialize};

/// HS256 token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: i64, // user id
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

impl From<&JwtClaims> for AuthUser {
    fn from(claims: &JwtClaims) -> Self {
        AuthUser {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

// Read from request parts so it can be combined with Multipart
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().copied().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    suggested_action: Some("Check authentication token".to_string()),
                    ..ErrorResponse::new("User not authenticated", "UNAUTHORIZED")
                }),
            )
        })
    }
}
