//! Authentication primitives: JWT issuing/validation, password hashing, and
//! federated (OAuth) identity providers.

pub mod jwt;
pub mod oauth;
pub mod password;
