//! Domain error taxonomy shared by every crate in the workspace.

/// Domain-level error for auth and user operations.
///
/// The HTTP layer maps each variant to a status code and a stable error
/// code; `Internal` and `Configuration` details are logged server-side and
/// never sent to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or mismatched input (caller-fault, non-retryable).
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or a bad/expired token. The message must not reveal
    /// which specific check failed.
    #[error("{0}")]
    Unauthorized(String),

    /// Business-rule rejection, e.g. a wrong or expired verification code.
    #[error("{0}")]
    NotAcceptable(String),

    /// Duplicate resource (unique constraint violation).
    #[error("{0}")]
    Conflict(String),

    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: String },

    /// A required secret or expiry setting is missing at runtime.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store, mail, or signing failure. The only retryable class.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a [`CoreError::NotFound`] for an entity/id pair.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}
