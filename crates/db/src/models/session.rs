//! Auth session model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use toktak_core::types::{DbId, Timestamp};

/// Lifecycle status of an auth session.
///
/// A session transitions `valid -> expired` exactly once and never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Valid,
    Expired,
}

/// Live-connection channels that can be bound to a session after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketChannel {
    Chat,
    Notifications,
    Realtime,
}

impl SocketChannel {
    /// Column holding this channel's socket reference on `auth_sessions`.
    pub(crate) fn column(self) -> &'static str {
        match self {
            SocketChannel::Chat => "chat_socket",
            SocketChannel::Notifications => "notifications_socket",
            SocketChannel::Realtime => "realtime_socket",
        }
    }

    /// Parse a channel from its route-parameter name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "chat" => Some(SocketChannel::Chat),
            "notifications" => Some(SocketChannel::Notifications),
            "realtime" => Some(SocketChannel::Realtime),
            _ => None,
        }
    }
}

/// An auth session row from the `auth_sessions` table.
///
/// One row per successful login (local or federated); multiple rows per
/// user coexist for multi-device support.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    /// The current refresh token for this session, or `None` before the
    /// token is bound (immediately after creation).
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub status: SessionStatus,
    pub chat_socket: Option<String>,
    pub notifications_socket: Option<String>,
    pub realtime_socket: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
