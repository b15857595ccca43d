//! Repository for the `auth_sessions` table.

use sqlx::PgPool;
use toktak_core::types::DbId;

use crate::models::session::{Session, SocketChannel};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token, status, chat_socket, \
                        notifications_socket, realtime_socket, created_at, updated_at";

/// Provides CRUD operations for auth sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session for a user, returning the created row.
    ///
    /// The session starts `valid` with no refresh token; the token is bound
    /// immediately after issuance via [`Self::set_refresh_token`].
    pub async fn create(pool: &PgPool, user_id: DbId) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO auth_sessions (user_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a session by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM auth_sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the user's most recent `valid` session.
    pub async fn find_current_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM auth_sessions
             WHERE user_id = $1 AND status = 'valid'
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Bind (or rotate) the session's current refresh token.
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: DbId,
        refresh_token: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE auth_sessions SET refresh_token = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(refresh_token)
            .fetch_optional(pool)
            .await
    }

    /// Mark a session expired.
    ///
    /// Returns `true` iff a row with this id exists -- including rows that
    /// were already expired, which makes logout idempotent. `false` means
    /// the session never existed and the caller should surface an error.
    pub async fn invalidate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE auth_sessions SET status = 'expired' WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bind a live-connection socket reference to the session (last write
    /// wins).
    pub async fn attach_socket(
        pool: &PgPool,
        id: DbId,
        channel: SocketChannel,
        value: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let column = channel.column();
        let query = format!(
            "UPDATE auth_sessions SET {column} = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(value)
            .fetch_optional(pool)
            .await
    }

    /// Clear a live-connection socket reference on the session.
    pub async fn detach_socket(
        pool: &PgPool,
        id: DbId,
        channel: SocketChannel,
    ) -> Result<Option<Session>, sqlx::Error> {
        let column = channel.column();
        let query = format!(
            "UPDATE auth_sessions SET {column} = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
