//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use toktak_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash and pending verification codes -- NEVER
/// serialize this to API responses directly. Use [`UserResponse`] for
/// external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `None` for accounts created through an OAuth provider.
    pub password_hash: Option<String>,
    pub photo: Option<String>,
    pub is_admin: bool,
    pub is_email_confirmed: bool,
    pub email_confirmation_code: Option<String>,
    pub email_confirmation_code_expires: Option<Timestamp>,
    pub password_reset_code: Option<String>,
    pub password_reset_code_expires: Option<Timestamp>,
    pub password_changed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Soft-delete tombstone; deleted users stay recoverable.
    pub deleted_at: Option<Timestamp>,
}

/// Safe user representation for API responses (no credential fields).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub is_admin: bool,
    pub is_email_confirmed: bool,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            photo: user.photo,
            is_admin: user.is_admin,
            is_email_confirmed: user.is_email_confirmed,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `None` when the account comes from an OAuth profile.
    pub password_hash: Option<String>,
    pub photo: Option<String>,
}
