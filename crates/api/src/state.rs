use std::sync::Arc;

use toktak_mail::Mailer;

use crate::auth::oauth::OauthProviders;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: toktak_db::DbPool,
    /// Server configuration (JWT secrets, code lifetimes, HTTP settings).
    pub config: Arc<ServerConfig>,
    /// Outbound email notifier.
    pub mailer: Arc<Mailer>,
    /// Registry of configured federated identity providers.
    pub oauth: Arc<OauthProviders>,
}
