//! Command implementations.

pub mod admin;
pub mod products;
pub mod sessions;

use rentalhub_storefront::backend::{BackendClient, BackendError};
use rentalhub_storefront::config::BackendConfig;
use thiserror::Error;
use url::Url;

/// Errors shared by commands that talk to the rental backend.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Environment variable is present but unusable.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),

    /// Input rejected before reaching the backend.
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// The backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Read a required environment variable.
fn required_env(key: &'static str) -> Result<String, CommandError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CommandError::MissingEnvVar(key))
}

/// Client for the backend at `RENTALHUB_API_URL`.
fn backend_client() -> Result<BackendClient, CommandError> {
    let raw = required_env("RENTALHUB_API_URL")?;
    let url = Url::parse(&raw)
        .map_err(|e| CommandError::InvalidEnvVar("RENTALHUB_API_URL", e.to_string()))?;
    Ok(BackendClient::new(&BackendConfig::new(url))?)
}
