//! Input-shape validation for the web-entry layer.
//!
//! These rules cover the *shape* of inbound fields (format, length,
//! character classes). Business rules -- match, existence, expiry -- stay in
//! the handlers and repositories. Shape checks run before any store access,
//! so a malformed code is rejected without touching the database.

use crate::codes::CODE_LENGTH;
use crate::error::CoreError;

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Maximum accepted password length.
pub const PASSWORD_MAX_LENGTH: usize = 20;

/// Validate an email address shape: one `@` with a dot somewhere after it.
///
/// Deliverability is proven by the confirmation-code round trip, not here.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation("Invalid email address".to_string()))
    }
}

/// Validate password strength: 10-20 characters with at least one digit,
/// one symbol, one lowercase and one uppercase letter.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    let length = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
        return Err(CoreError::Validation(format!(
            "Password must be between {PASSWORD_MIN_LENGTH} and {PASSWORD_MAX_LENGTH} characters long"
        )));
    }
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    if !(has_digit && has_symbol && has_lower && has_upper) {
        return Err(CoreError::Validation(
            "Password must contain a digit, a symbol, an uppercase and a lowercase letter"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate a verification/reset code shape: exactly 6 uppercase
/// alphanumeric characters.
///
/// Wrong case or wrong length is rejected here, before any expiry check.
pub fn validate_code(code: &str) -> Result<(), CoreError> {
    let well_formed = code.len() == CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Code must be {CODE_LENGTH} uppercase alphanumeric characters"
        )))
    }
}
