pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                  register (public)
/// /auth/verify                  confirm email (public)
/// /auth/login                   login (public)
/// /auth/{provider}/callback     federated login landing (public)
/// /auth/refresh                 refresh (refresh token)
/// /auth/logout                  logout (requires auth)
/// /auth/forgot-password         start password reset (public)
/// /auth/verify-reset-code       redeem reset code (public)
/// /auth/reset-password          set new password (reset token)
/// /auth/sockets/{channel}       bind / clear socket refs (requires auth)
///
/// /users/me                     profile, delete account (requires auth)
/// /users/me/change-email        start email change (requires auth)
/// /users/me/email               complete email change (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and session lifecycle.
        .nest("/auth", auth::router())
        // Authenticated account management.
        .nest("/users", users::router())
}
