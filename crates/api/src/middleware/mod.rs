//! Authentication middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from an access-token
//!   Bearer header.
//! - [`auth::RefreshAuthUser`] -- Extracts the user from a refresh-token Bearer
//!   header (only the token-refresh endpoint accepts these).

pub mod auth;
