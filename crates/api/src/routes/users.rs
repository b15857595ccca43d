//! Route definitions for the `/users` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users` (all require auth).
///
/// ```text
/// GET    /me               -> me
/// DELETE /me               -> delete_me
/// POST   /me/change-email  -> change_email
/// PUT    /me/email         -> update_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me).delete(users::delete_me))
        .route("/me/change-email", post(users::change_email))
        .route("/me/email", put(users::update_email))
}
