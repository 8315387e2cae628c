//! Domain models for storefront.
//!
//! Rental entities themselves live in [`crate::backend`]; this module holds
//! what the storefront keeps in its own session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
