//! Repository for the `users` table.

use sqlx::PgPool;
use toktak_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, first_name, last_name, password_hash, photo, is_admin, \
                        is_email_confirmed, email_confirmation_code, \
                        email_confirmation_code_expires, password_reset_code, \
                        password_reset_code_expires, password_changed_at, \
                        created_at, updated_at, deleted_at";

/// Provides CRUD operations for users.
///
/// All lookups skip soft-deleted rows (`deleted_at IS NULL`).
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A duplicate email violates `uq_users_email`; the caller maps that to
    /// a typed conflict.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, first_name, last_name, password_hash, photo)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.password_hash)
            .bind(&input.photo)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Store a fresh email-confirmation code and its expiry on the user.
    ///
    /// Overwrites any previous code; only one code per purpose is active.
    pub async fn set_email_confirmation_code(
        pool: &PgPool,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                email_confirmation_code = $2,
                email_confirmation_code_expires = $3
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Consume an email-confirmation code for a user.
    ///
    /// A single guarded UPDATE: the code fields are cleared and
    /// `is_email_confirmed` is set only when the code matches AND is still
    /// unexpired. A wrong, replayed, or expired code returns `None` without
    /// mutating anything.
    pub async fn consume_email_confirmation_code(
        pool: &PgPool,
        code: &str,
        user_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                is_email_confirmed = true,
                email_confirmation_code = NULL,
                email_confirmation_code_expires = NULL
             WHERE id = $1
               AND email_confirmation_code = $2
               AND email_confirmation_code_expires > NOW()
               AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Store a fresh password-reset code and its expiry, addressed by email.
    ///
    /// Returns `true` if a matching user row was updated.
    pub async fn set_password_reset_code(
        pool: &PgPool,
        email: &str,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                password_reset_code = $2,
                password_reset_code_expires = $3
             WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume a password-reset code for a user.
    ///
    /// Same discipline as [`Self::consume_email_confirmation_code`]: clears
    /// the code fields only when the code matches and is unexpired.
    pub async fn consume_password_reset_code(
        pool: &PgPool,
        code: &str,
        user_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                password_reset_code = NULL,
                password_reset_code_expires = NULL
             WHERE id = $1
               AND password_reset_code = $2
               AND password_reset_code_expires > NOW()
               AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash and stamp `password_changed_at`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                password_hash = $2,
                password_changed_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update a user's email address, returning the updated row.
    pub async fn update_email(
        pool: &PgPool,
        id: DbId,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET email = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a user by stamping `deleted_at`.
    ///
    /// Returns `true` if the row was tombstoned.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
