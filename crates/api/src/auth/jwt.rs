//! JWT issuing and validation for access, refresh, and password-reset tokens.
//!
//! All three token kinds are HS256-signed JWTs carrying the same [`Claims`]
//! payload; each kind has its own signing secret and lifetime so a leaked
//! access secret cannot be used to forge refresh or reset tokens. Access and
//! refresh tokens are bound to an auth session via `session_id`; reset tokens
//! are session-independent and carry `None`.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use toktak_core::types::DbId;
use uuid::Uuid;

/// The three token kinds the service signs, each with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token authorizing API requests.
    Access,
    /// Long-lived token redeemable for new access tokens.
    Refresh,
    /// Short-lived token authorizing a single password reset.
    PasswordReset,
}

impl TokenKind {
    /// Human-readable kind name for logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::PasswordReset => "password reset",
        }
    }
}

/// Error type for token issuing and validation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The signing secret for this token kind is not configured.
    #[error("Missing signing secret for {0} tokens")]
    Configuration(&'static str),

    /// Signature, expiry, or structural validation failed.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims embedded in every token the service signs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's email at issue time.
    pub email: String,
    /// Whether the user holds the admin role.
    pub is_admin: bool,
    /// The auth session this token is bound to (`None` for reset tokens).
    pub session_id: Option<DbId>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Signing secret and lifetime for one token kind.
#[derive(Debug, Clone)]
pub struct TokenParams {
    /// HMAC-SHA256 secret used to sign and verify tokens of this kind.
    pub secret: String,
    /// Token lifetime in minutes.
    pub expiry_mins: i64,
}

/// Per-kind JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Access-token secret and lifetime (default 15 minutes).
    pub access: TokenParams,
    /// Refresh-token secret and lifetime (default 7 days).
    pub refresh: TokenParams,
    /// Password-reset-token secret and lifetime (default 10 minutes).
    pub password_reset: TokenParams,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in minutes (7 days).
const DEFAULT_REFRESH_EXPIRY_MINS: i64 = 7 * 24 * 60;
/// Default password-reset token expiry in minutes.
const DEFAULT_RESET_EXPIRY_MINS: i64 = 10;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                          | Required | Default |
    /// |----------------------------------|----------|---------|
    /// | `JWT_ACCESS_SECRET`              | yes*     | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`         | no       | `15`    |
    /// | `JWT_REFRESH_SECRET`             | yes*     | --      |
    /// | `JWT_REFRESH_EXPIRY_MINS`        | no       | `10080` |
    /// | `JWT_PASSWORD_RESET_SECRET`      | yes*     | --      |
    /// | `JWT_PASSWORD_RESET_EXPIRY_MINS` | no       | `10`    |
    ///
    /// *An unset secret loads as empty; issuing or validating tokens of that
    /// kind then fails with [`TokenError::Configuration`] rather than at
    /// startup, so unrelated endpoints keep working.
    pub fn from_env() -> Self {
        Self {
            access: TokenParams {
                secret: std::env::var("JWT_ACCESS_SECRET").unwrap_or_default(),
                expiry_mins: expiry_from_env("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            },
            refresh: TokenParams {
                secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or_default(),
                expiry_mins: expiry_from_env(
                    "JWT_REFRESH_EXPIRY_MINS",
                    DEFAULT_REFRESH_EXPIRY_MINS,
                ),
            },
            password_reset: TokenParams {
                secret: std::env::var("JWT_PASSWORD_RESET_SECRET").unwrap_or_default(),
                expiry_mins: expiry_from_env(
                    "JWT_PASSWORD_RESET_EXPIRY_MINS",
                    DEFAULT_RESET_EXPIRY_MINS,
                ),
            },
        }
    }

    /// The secret and lifetime for the given token kind.
    pub fn params(&self, kind: TokenKind) -> &TokenParams {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
            TokenKind::PasswordReset => &self.password_reset,
        }
    }
}

fn expiry_from_env(var: &str, default: i64) -> i64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Sign a token of the given kind for the given user.
///
/// `session_id` binds access and refresh tokens to their auth session and
/// must be `None` for password-reset tokens.
pub fn issue_token(
    kind: TokenKind,
    user_id: DbId,
    email: &str,
    is_admin: bool,
    session_id: Option<DbId>,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let params = config.params(kind);
    if params.secret.is_empty() {
        return Err(TokenError::Configuration(kind.name()));
    }

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        is_admin,
        session_id,
        exp: now + params.expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    Ok(encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(params.secret.as_bytes()),
    )?)
}

/// Validate a token against the given kind's secret, returning its [`Claims`].
///
/// Validates the signature and expiration. A token signed with a different
/// kind's secret fails here, which is what keeps a refresh token from being
/// replayed as an access token.
pub fn verify_token(token: &str, kind: TokenKind, config: &JwtConfig) -> Result<Claims, TokenError> {
    let params = config.params(kind);
    if params.secret.is_empty() {
        return Err(TokenError::Configuration(kind.name()));
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(params.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// Decode a token's claims without checking signature or expiry.
///
/// Only for diagnostics (logging which account presented a bad token). Never
/// trust the result for authorization.
pub fn decode_unverified(token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(token_data.claims)
}
