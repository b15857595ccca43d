//! Handlers for the `/auth` resource (signup, verification, login, refresh,
//! logout, password reset, federated login, socket bindings).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use toktak_core::error::CoreError;
use toktak_core::{codes, validation};
use toktak_db::models::session::{Session, SocketChannel};
use toktak_db::models::user::{CreateUser, User, UserResponse};
use toktak_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{issue_token, verify_token, TokenKind};
use crate::auth::oauth::{NormalizedProfile, OauthError};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::{AuthUser, RefreshAuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for `POST /auth/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query parameters of the provider's callback redirect.
#[derive(Debug, Deserialize)]
pub struct OauthCallbackQuery {
    pub code: String,
}

/// Request body for `POST /auth/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for `POST /auth/verify-reset-code`.
#[derive(Debug, Deserialize)]
pub struct VerifyResetCodeRequest {
    pub email: String,
    pub code: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for `PUT /auth/sockets/{channel}`.
#[derive(Debug, Deserialize)]
pub struct AttachSocketRequest {
    pub socket_id: String,
}

/// Generic acknowledgement payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Successful authentication response returned by login and OAuth login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response for `POST /auth/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response for `POST /auth/verify-reset-code`.
#[derive(Debug, Serialize)]
pub struct VerifyResetCodeResponse {
    pub message: String,
    pub reset_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a local account and send an email-confirmation code.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    // 1. Shape checks before any store access.
    if input.password != input.confirm_password {
        return Err(AppError::Core(CoreError::Validation(
            "Passwords do not match".into(),
        )));
    }
    validation::validate_email(&input.email)?;
    validation::validate_password(&input.password)?;

    // 2. Hash the password.
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // 3. Create the user; a duplicate email is a conflict, not a 500.
    let create = CreateUser {
        email: input.email.clone(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        password_hash: Some(password_hash),
        photo: None,
    };
    let user = UserRepo::create(&state.pool, &create).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Core(CoreError::Conflict("User already exists".into()))
        } else {
            AppError::Database(e)
        }
    })?;

    // 4. Issue the confirmation code and mail it.
    send_confirmation_code(&state, &user).await?;

    tracing::info!(user_id = user.id, "New user signed up");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!(
                "Please verify your email, we sent you a verification code in your mail: {}",
                user.email
            ),
        }),
    ))
}

/// POST /api/v1/auth/verify
///
/// Confirm the account's email address with the mailed code.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    // 1. A malformed code never reaches the store.
    validation::validate_code(&input.code)?;

    // 2. Resolve the account.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", &input.email)))?;

    // 3. Atomic consume: wrong, replayed, or expired codes all fail the same way.
    UserRepo::consume_email_confirmation_code(&state.pool, &input.code, user.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotAcceptable("Invalid verification code".into()))
        })?;

    // 4. Confirmed accounts get the welcome mail.
    state
        .mailer
        .send_welcome(&user.email, &user.first_name)
        .await?;

    tracing::info!(user_id = user.id, "Email verified");

    Ok(Json(MessageResponse {
        message: "Email verified successfully".into(),
    }))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Opens a new auth session and returns
/// session-bound access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    // 1. Resolve the account. Unknown email and wrong password are
    //    indistinguishable to the caller.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid credentials".into())))?;

    // 2. OAuth-only accounts have no local password.
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid credentials".into())))?;

    // 3. Verify the password.
    let password_valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid credentials".into(),
        )));
    }

    // 4. Open a session and issue its token pair.
    let response = create_login_response(&state, user).await?;

    Ok(Json(response))
}

/// GET /api/v1/auth/{provider}/callback
///
/// Federated login landing point. Redeems the authorization code with the
/// named provider, then either registers a new account (mirroring signup) or
/// logs the existing one in.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OauthCallbackQuery>,
) -> AppResult<Response> {
    // 1. Unknown or unconfigured providers are a 404, not a 401.
    let provider = state
        .oauth
        .get(&provider)
        .ok_or_else(|| AppError::Core(CoreError::not_found("OAuth provider", &provider)))?;

    // 2. Redeem the code for a normalized profile.
    let profile = provider.exchange_code(&query.code).await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "OAuth exchange failed");
        match e {
            OauthError::Http(_) => AppError::InternalError("OAuth provider unavailable".into()),
            OauthError::Exchange(_) => {
                AppError::Core(CoreError::Unauthorized("OAuth code exchange failed".into()))
            }
        }
    })?;

    // 3. Existing account: log in. New account: register and require email
    //    confirmation like a local signup.
    match UserRepo::find_by_email(&state.pool, &profile.email).await? {
        Some(user) => {
            let response = create_login_response(&state, user).await?;
            Ok(Json(response).into_response())
        }
        None => {
            let user = register_federated_user(&state, &profile).await?;
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse {
                    message: format!(
                        "Please verify your email, we sent you a verification code in your mail: {}",
                        user.email
                    ),
                }),
            )
                .into_response())
        }
    }
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new access token. The refresh token
/// itself is reused until it expires; it is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    refresh_user: RefreshAuthUser,
) -> AppResult<Json<RefreshResponse>> {
    // 1. The presented token already passed the refresh-secret check; now it
    //    must also be the one bound to the user's current valid session.
    let session = SessionRepo::find_current_for_user(&state.pool, refresh_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let stored = session.refresh_token.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    })?;

    // 2. Only the token currently bound to the session can mint access
    //    tokens; a stale or foreign one fails even with a good signature.
    if refresh_user.token != stored {
        tracing::debug!(session_id = session.id, "Presented refresh token is not the bound one");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        )));
    }

    // 3. The account must still exist.
    let user = UserRepo::find_by_id(&state.pool, refresh_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    // 4. Mint a fresh access token bound to the same session.
    let access_token = issue_token(
        TokenKind::Access,
        user.id,
        &user.email,
        user.is_admin,
        Some(session.id),
        &state.config.jwt,
    )?;

    Ok(Json(RefreshResponse {
        access_token,
        refresh_token: stored.to_string(),
    }))
}

/// POST /api/v1/auth/logout
///
/// Expire the session the access token is bound to. Logging out an
/// already-expired session succeeds (idempotent); a session that never
/// existed is a 404.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let existed = SessionRepo::invalidate(&state.pool, auth_user.session_id).await?;
    if !existed {
        return Err(AppError::Core(CoreError::not_found(
            "Session",
            auth_user.session_id,
        )));
    }

    tracing::info!(user_id = auth_user.user_id, session_id = auth_user.session_id, "User logged out");

    Ok(Json(MessageResponse {
        message: "User logged out successfully".into(),
    }))
}

/// POST /api/v1/auth/forgot-password
///
/// Start the password-reset flow by mailing a reset code.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    validation::validate_email(&input.email)?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", &input.email)))?;

    let code = codes::generate();
    let expires = codes::expires_at(state.config.codes.password_reset_expiry_mins);
    UserRepo::set_password_reset_code(&state.pool, &user.email, &code, expires).await?;

    state
        .mailer
        .send_password_reset_code(&user.email, &user.first_name, &code)
        .await?;

    Ok(Json(MessageResponse {
        message: format!(
            "We sent a password reset code to your email: {}",
            user.email
        ),
    }))
}

/// POST /api/v1/auth/verify-reset-code
///
/// Redeem the mailed reset code for a short-lived reset token.
pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(input): Json<VerifyResetCodeRequest>,
) -> AppResult<Json<VerifyResetCodeResponse>> {
    // 1. Shape first: a malformed code is a 400 even when expired.
    validation::validate_code(&input.code)?;

    // 2. Resolve the account.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", &input.email)))?;

    // 3. Atomic consume.
    let user = UserRepo::consume_password_reset_code(&state.pool, &input.code, user.id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotAcceptable("Invalid reset code".into())))?;

    // 4. The reset token is session-independent: it authorizes exactly one
    //    operation, not API access.
    let reset_token = issue_token(
        TokenKind::PasswordReset,
        user.id,
        &user.email,
        user.is_admin,
        None,
        &state.config.jwt,
    )?;

    Ok(Json(VerifyResetCodeResponse {
        message: "Reset code verified".into(),
        reset_token,
    }))
}

/// POST /api/v1/auth/reset-password
///
/// Set a new password using a reset token from `verify-reset-code`.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    // 1. Shape checks run regardless of token validity.
    if input.password != input.confirm_password {
        return Err(AppError::Core(CoreError::Validation(
            "Passwords do not match".into(),
        )));
    }
    validation::validate_password(&input.password)?;

    // 2. The token must verify against the reset secret specifically.
    let claims = verify_token(&input.reset_token, TokenKind::PasswordReset, &state.config.jwt)
        .map_err(|e| {
            tracing::debug!(error = %e, "Reset token rejected");
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired reset token".into(),
            ))
        })?;

    // 3. Resolve the account from the token's email claim.
    let user = UserRepo::find_by_email(&state.pool, &claims.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", &claims.email)))?;

    // 4. Hash and store the new password.
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let updated = UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    if !updated {
        return Err(AppError::Core(CoreError::not_found("User", user.id)));
    }

    // 5. Notify the account owner.
    state
        .mailer
        .send_password_changed(&user.email, &user.first_name)
        .await?;

    tracing::info!(user_id = user.id, "Password reset");

    Ok(Json(MessageResponse {
        message: "Password reset successfully".into(),
    }))
}

/// PUT /api/v1/auth/sockets/{channel}
///
/// Bind a live-connection socket reference to the current session.
pub async fn attach_socket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(channel): Path<String>,
    Json(input): Json<AttachSocketRequest>,
) -> AppResult<Json<Session>> {
    let channel = parse_channel(&channel)?;

    let session =
        SessionRepo::attach_socket(&state.pool, auth_user.session_id, channel, &input.socket_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::not_found("Session", auth_user.session_id))
            })?;

    Ok(Json(session))
}

/// DELETE /api/v1/auth/sockets/{channel}
///
/// Clear a socket reference on the current session.
pub async fn detach_socket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(channel): Path<String>,
) -> AppResult<Json<Session>> {
    let channel = parse_channel(&channel)?;

    let session = SessionRepo::detach_socket(&state.pool, auth_user.session_id, channel)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Session", auth_user.session_id)))?;

    Ok(Json(session))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_channel(name: &str) -> Result<SocketChannel, AppError> {
    SocketChannel::parse(name).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown socket channel: {name}"
        )))
    })
}

/// Issue an email-confirmation code for the user and mail it.
async fn send_confirmation_code(state: &AppState, user: &User) -> AppResult<()> {
    let code = codes::generate();
    let expires = codes::expires_at(state.config.codes.email_confirmation_expiry_mins);
    UserRepo::set_email_confirmation_code(&state.pool, user.id, &code, expires).await?;

    state
        .mailer
        .send_confirmation_code(&user.email, &user.first_name, &code)
        .await?;

    Ok(())
}

/// Open a new auth session for the user, issue its session-bound token pair,
/// and bind the refresh token to the session row.
async fn create_login_response(state: &AppState, user: User) -> AppResult<LoginResponse> {
    // 1. One session per login.
    let session = SessionRepo::create(&state.pool, user.id).await?;

    // 2. Both tokens carry the session id.
    let access_token = issue_token(
        TokenKind::Access,
        user.id,
        &user.email,
        user.is_admin,
        Some(session.id),
        &state.config.jwt,
    )?;
    let refresh_token = issue_token(
        TokenKind::Refresh,
        user.id,
        &user.email,
        user.is_admin,
        Some(session.id),
        &state.config.jwt,
    )?;

    // 3. The session remembers its current refresh token for the refresh
    //    endpoint's equality check.
    SessionRepo::set_refresh_token(&state.pool, session.id, &refresh_token)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Session", session.id)))?;

    tracing::info!(user_id = user.id, session_id = session.id, "User logged in");

    Ok(LoginResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

/// Create an account from an OAuth profile and start email confirmation.
async fn register_federated_user(
    state: &AppState,
    profile: &NormalizedProfile,
) -> AppResult<User> {
    let create = CreateUser {
        email: profile.email.clone(),
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        password_hash: None,
        photo: profile.photo.clone(),
    };
    let user = UserRepo::create(&state.pool, &create).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Core(CoreError::Conflict("User already exists".into()))
        } else {
            AppError::Database(e)
        }
    })?;

    send_confirmation_code(state, &user).await?;

    tracing::info!(
        user_id = user.id,
        provider = profile.provider,
        "New federated user registered"
    );

    Ok(user)
}
