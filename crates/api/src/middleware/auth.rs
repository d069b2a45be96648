//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fileguard_core::error::CoreError;
use fileguard_core::types::DbId;
use fileguard_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's email (from `claims.sub`); recorded as the owner of
    /// submitted tasks.
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser { email: claims.sub })
    }
}

impl AuthUser {
    /// Look up the database id of the authenticated user.
    ///
    /// Returns 404 when the token's subject has no `users` row.
    pub async fn user_id(&self, pool: &fileguard_db::DbPool) -> Result<DbId, AppError> {
        UserRepo::find_by_email(pool, &self.email)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "User",
                    id: self.email.clone(),
                })
            })
    }
}
