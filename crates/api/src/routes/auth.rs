//! Route definitions for the `/auth` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /signup                 -> signup
/// POST   /verify                 -> verify_email
/// POST   /login                  -> login
/// GET    /{provider}/callback    -> oauth_callback
/// POST   /refresh                -> refresh (refresh token)
/// POST   /logout                 -> logout (requires auth)
/// POST   /forgot-password        -> forgot_password
/// POST   /verify-reset-code      -> verify_reset_code
/// POST   /reset-password         -> reset_password (reset token in body)
/// PUT    /sockets/{channel}      -> attach_socket (requires auth)
/// DELETE /sockets/{channel}      -> detach_socket (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/verify", post(auth::verify_email))
        .route("/login", post(auth::login))
        .route("/{provider}/callback", get(auth::oauth_callback))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/verify-reset-code", post(auth::verify_reset_code))
        .route("/reset-password", post(auth::reset_password))
        .route(
            "/sockets/{channel}",
            put(auth::attach_socket).delete(auth::detach_socket),
        )
}
