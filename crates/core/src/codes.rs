//! Verification/reset code generation and expiry.
//!
//! Codes are the human-enterable first factor in the email-verification and
//! password-reset flows: 6 uppercase alphanumeric characters stored on the
//! user row next to an expiry timestamp. They do not need to be
//! cryptographically unguessable, only collision-unlikely within the expiry
//! window.

use rand::Rng;

use crate::types::Timestamp;

/// Length of a verification/reset code.
pub const CODE_LENGTH: usize = 6;

/// Alphabet the codes are drawn from (uppercase base 36).
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random [`CODE_LENGTH`]-character uppercase alphanumeric code.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Compute the expiry timestamp for a code issued now.
///
/// The window is a per-purpose configuration value (email confirmation and
/// password reset are tuned independently).
pub fn expires_at(expiry_mins: i64) -> Timestamp {
    chrono::Utc::now() + chrono::Duration::minutes(expiry_mins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_has_expected_shape() {
        let code = generate();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(
            code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "code must be uppercase alphanumeric, got {code}"
        );
    }

    #[test]
    fn codes_are_not_constant() {
        // 100 draws from a 36^6 space colliding on every draw would mean a
        // broken generator, not bad luck.
        let first = generate();
        let any_different = (0..100).any(|_| generate() != first);
        assert!(any_different, "generator produced the same code 100 times");
    }

    #[test]
    fn expiry_is_in_the_future() {
        let expires = expires_at(15);
        let delta = expires - chrono::Utc::now();
        assert!(delta.num_minutes() >= 14);
        assert!(delta.num_minutes() <= 15);
    }
}
