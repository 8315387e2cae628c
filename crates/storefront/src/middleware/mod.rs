//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP with the nonce from step 6, HSTS-free defaults)
//! 5. Session layer (tower-sessions with `PostgreSQL` store, signed cookie)
//! 6. CSP nonce (generate per-request nonce for inline scripts)
//! 7. Rate limiting on `/auth` form posts (governor)

pub mod auth;
pub mod backend_session;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, RequireSeller, set_current_user};
pub use backend_session::{BackendCookies, store_backend_session};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::auth_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::session_layer;
