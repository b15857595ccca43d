//! Handlers for the `/users` resource (profile, email change, account
//! deletion).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use toktak_core::error::CoreError;
use toktak_core::{codes, validation};
use toktak_db::models::user::UserResponse;
use toktak_db::repositories::{SessionRepo, UserRepo};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::handlers::auth::MessageResponse;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /users/me/email`.
#[derive(Debug, Deserialize)]
pub struct UpdateEmailRequest {
    pub code: String,
    pub email: String,
}

/// Response for `POST /users/me/change-email`.
#[derive(Debug, Serialize)]
pub struct ChangeEmailResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
///
/// The authenticated user's own profile.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth_user.user_id)))?;

    Ok(Json(user.into()))
}

/// POST /api/v1/users/me/change-email
///
/// Start an email change by mailing a confirmation code to the CURRENT
/// address. Proves the caller still controls the mailbox being moved away
/// from.
pub async fn change_email(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ChangeEmailResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth_user.user_id)))?;

    let code = codes::generate();
    let expires = codes::expires_at(state.config.codes.email_confirmation_expiry_mins);
    UserRepo::set_email_confirmation_code(&state.pool, user.id, &code, expires).await?;

    state
        .mailer
        .send_email_update_code(&user.email, &user.first_name, &code)
        .await?;

    Ok(Json(ChangeEmailResponse {
        message: format!(
            "We sent an email update confirmation code to: {}",
            user.email
        ),
    }))
}

/// PUT /api/v1/users/me/email
///
/// Complete an email change: redeem the code mailed by `change-email` and
/// set the new address.
pub async fn update_email(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateEmailRequest>,
) -> AppResult<Json<UserResponse>> {
    // 1. Shape checks before any store access.
    validation::validate_code(&input.code)?;
    validation::validate_email(&input.email)?;

    // 2. Atomic consume against the current user.
    UserRepo::consume_email_confirmation_code(&state.pool, &input.code, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotAcceptable("Invalid verification code".into()))
        })?;

    // 3. Move to the new address; it must still be unique.
    let user = UserRepo::update_email(&state.pool, auth_user.user_id, &input.email)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Core(CoreError::Conflict("Email already in use".into()))
            } else {
                AppError::Database(e)
            }
        })?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth_user.user_id)))?;

    tracing::info!(user_id = user.id, "Email updated");

    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/me
///
/// Soft-delete the account and expire the current session.
pub async fn delete_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    // Close the session first: a session id that never existed means a
    // forged token, and the account must stay untouched.
    let existed = SessionRepo::invalidate(&state.pool, auth_user.session_id).await?;
    if !existed {
        return Err(AppError::Core(CoreError::not_found(
            "Session",
            auth_user.session_id,
        )));
    }

    let deleted = UserRepo::soft_delete(&state.pool, auth_user.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found(
            "User",
            auth_user.user_id,
        )));
    }

    tracing::info!(user_id = auth_user.user_id, "Account deleted");

    Ok(Json(MessageResponse {
        message: "Account deleted successfully".into(),
    }))
}
