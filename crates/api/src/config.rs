use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (per-kind secrets and expiry durations).
    pub jwt: JwtConfig,
    /// Verification-code lifetimes.
    pub codes: CodeConfig,
}

/// Lifetimes for the emailed one-time verification codes.
#[derive(Debug, Clone)]
pub struct CodeConfig {
    /// Email-confirmation code lifetime in minutes (default: `15`).
    pub email_confirmation_expiry_mins: i64,
    /// Password-reset code lifetime in minutes (default: `10`).
    pub password_reset_expiry_mins: i64,
}

/// Default email-confirmation code expiry in minutes.
const DEFAULT_CONFIRMATION_CODE_EXPIRY_MINS: i64 = 15;
/// Default password-reset code expiry in minutes.
const DEFAULT_RESET_CODE_EXPIRY_MINS: i64 = 10;

impl CodeConfig {
    /// Load code lifetimes from environment variables.
    ///
    /// | Env Var                          | Default |
    /// |----------------------------------|---------|
    /// | `EMAIL_CONFIRMATION_EXPIRY_MINS` | `15`    |
    /// | `PASSWORD_RESET_EXPIRY_MINS`     | `10`    |
    pub fn from_env() -> Self {
        let email_confirmation_expiry_mins: i64 = std::env::var("EMAIL_CONFIRMATION_EXPIRY_MINS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONFIRMATION_CODE_EXPIRY_MINS);

        let password_reset_expiry_mins: i64 = std::env::var("PASSWORD_RESET_EXPIRY_MINS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RESET_CODE_EXPIRY_MINS);

        Self {
            email_confirmation_expiry_mins,
            password_reset_expiry_mins,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// JWT and code settings are documented on [`JwtConfig::from_env`] and
    /// [`CodeConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            codes: CodeConfig::from_env(),
        }
    }
}
