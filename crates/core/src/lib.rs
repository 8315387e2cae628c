//! RentalHub Core - Shared types library.
//!
//! This crate provides common types used across all RentalHub components:
//! - `storefront` - Server-rendered rental marketplace front-end
//! - `cli` - Command-line tools for sessions and backend bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types, validation rules and pure
//! calculations - no I/O, no database access, no HTTP clients. The rental
//! backend owns all persistent data; these types mirror its JSON shapes.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, rental rates and statuses
//! - [`validation`] - Form validation producing field-keyed errors
//! - [`pagination`] - Page requests and infinite-scroll page bookkeeping
//! - [`wishlist`] - Wishlist totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod types;
pub mod validation;
pub mod wishlist;

pub use pagination::{Page, PageRequest};
pub use types::*;
pub use validation::FieldErrors;
pub use wishlist::{WishlistLine, WishlistSummary};
