//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use toktak_core::error::CoreError;
use toktak_core::types::DbId;

use crate::auth::jwt::{verify_token, TokenKind};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from an access-token Bearer header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's email at token-issue time.
    pub email: String,
    /// Whether the user holds the admin role.
    pub is_admin: bool,
    /// The auth session the token is bound to.
    pub session_id: DbId,
}

/// User extracted from a refresh-token Bearer header.
///
/// Only the token-refresh endpoint accepts refresh tokens; everywhere else
/// they fail [`AuthUser`]'s access-secret check.
#[derive(Debug, Clone)]
pub struct RefreshAuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The auth session the token is bound to.
    pub session_id: DbId,
    /// The raw presented token, for the equality check against the one
    /// stored on the session.
    pub token: String,
}

/// Pull the raw token out of the `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = verify_token(token, TokenKind::Access, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        // Reset tokens carry no session id and must not authorize API calls.
        let session_id = claims.session_id.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
            session_id,
        })
    }
}

impl FromRequestParts<AppState> for RefreshAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = verify_token(token, TokenKind::Refresh, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

        let session_id = claims.session_id.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

        Ok(RefreshAuthUser {
            user_id: claims.sub,
            session_id,
            token: token.to_string(),
        })
    }
}
