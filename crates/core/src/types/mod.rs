//! Core types for RentalHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{QuoteError, RentalRates, RentalUnit, format_money};
pub use status::*;
