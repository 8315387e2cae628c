//! REST client for the rental backend.
//!
//! # Architecture
//!
//! - The backend owns all data, authentication, sessions and CSRF
//! - Each browser session carries a [`BackendSession`] holding the backend's
//!   `csrftoken` and `sessionid` cookies; the client attaches them to every
//!   call and absorbs every `Set-Cookie` the backend returns
//! - Mutating requests fetch a CSRF token first when none is held, then echo
//!   it in `X-CSRFToken` with a `Referer` on the backend origin
//! - In-memory caching via `moka` for public product listing pages (60 second TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use rentalhub_storefront::backend::{BackendClient, BackendSession};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let mut session = BackendSession::default();
//!
//! let user = client.login(&mut session, "asha", "Secret123").await?;
//! let page = client.products(&mut session, &PageRequest::default(), true).await?;
//! ```

mod cache;
mod client;
pub mod sample;
mod session;
pub mod types;

pub use client::{BackendClient, FileUpload, ProductSubmission, ProfileSubmission};
pub use session::{BackendSession, CSRF_COOKIE, SESSION_COOKIE};
pub use types::*;

use rentalhub_core::FieldErrors;
use thiserror::Error;

/// Errors that can occur when calling the rental backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An API path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend rejected the input (HTTP 400).
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// No authenticated backend session (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The CSRF bootstrap response did not set a `csrftoken` cookie.
    #[error("Backend did not issue a CSRF token")]
    MissingCsrfToken,
}

impl BackendError {
    /// Whether the backend could not be reached or failed on its side,
    /// as opposed to rejecting the request.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::MissingCsrfToken => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the backend session is gone and the user must sign in again.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Errors to render on a form.
    ///
    /// Validation errors keep their fields; everything else becomes a
    /// page-level message.
    #[must_use]
    pub fn into_field_errors(self) -> FieldErrors {
        match self {
            Self::Validation(errors) => errors,
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::NotFound(msg) => {
                FieldErrors::non_field(msg)
            }
            Self::RateLimited(secs) => FieldErrors::non_field(format!(
                "Too many attempts. Please wait {secs} seconds and try again."
            )),
            other => {
                tracing::warn!(error = %other, "Backend call failed");
                FieldErrors::non_field("Something went wrong. Please try again later.")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product 9".to_string());
        assert_eq!(err.to_string(), "Not found: product 9");

        let err = BackendError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 502: Bad Gateway");
    }

    #[test]
    fn test_is_unavailable() {
        assert!(
            BackendError::Status {
                status: 503,
                message: String::new()
            }
            .is_unavailable()
        );
        assert!(
            !BackendError::Status {
                status: 409,
                message: String::new()
            }
            .is_unavailable()
        );
        assert!(!BackendError::Unauthorized(String::new()).is_unavailable());
        assert!(BackendError::MissingCsrfToken.is_unavailable());
    }

    #[test]
    fn test_into_field_errors() {
        let mut fields = FieldErrors::new();
        fields.add("email", "Email already in use");
        let errors = BackendError::Validation(fields).into_field_errors();
        assert_eq!(errors.first("email"), Some("Email already in use"));

        let errors = BackendError::Forbidden("Unauthorized".to_string()).into_field_errors();
        assert_eq!(errors.general(), Some("Unauthorized"));

        let errors = BackendError::RateLimited(30).into_field_errors();
        assert!(errors.general().unwrap().contains("30 seconds"));
    }
}
