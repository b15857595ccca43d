//! Shared domain primitives for the Toktak auth backend.
//!
//! - [`types`] -- id and timestamp aliases used across all crates.
//! - [`error`] -- the domain error taxonomy ([`error::CoreError`]).
//! - [`codes`] -- verification/reset code generation and expiry.
//! - [`validation`] -- input-shape rules enforced by the web-entry layer.

pub mod codes;
pub mod error;
pub mod types;
pub mod validation;
