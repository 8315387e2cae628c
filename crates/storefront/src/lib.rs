//! RentalHub storefront library.
//!
//! Server-rendered marketplace front-end over the rental backend's REST
//! API. Exposed as a library so the binary and integration tests share one
//! router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
