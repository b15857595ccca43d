//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Where needed, a `Serialize` response struct that strips sensitive fields

pub mod session;
pub mod user;
